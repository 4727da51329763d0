/********************************************************************************
 * Copyright (c) 2025 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

mod commands;
mod config;
mod web;

use crate::commands::SendOverrides;
use crate::config::Config;
use capability_static_file::CapabilityStaticFile;
use clap::{Parser, Subcommand};
use dx_simulator::discovery::DiscoveryEngine;
use dx_simulator::routing::RoutingContext;
use dx_simulator::{CannedResponder, ExchangeRouter, HttpSubmissionGateway, XmlDocumentModel};
use std::fs::File;
use std::io::Read;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command()]
struct SimulatorArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,
    #[command(subcommand)]
    command: Option<SimulatorCommand>,
}

#[derive(Subcommand)]
enum SimulatorCommand {
    /// Submit a request document to the local connector and exit.
    SendRequest {
        /// Document file to submit instead of the built-in default.
        #[arg(short, long, value_name = "FILE")]
        file: Option<String>,
        #[arg(long)]
        sender: Option<String>,
        #[arg(long)]
        receiver: Option<String>,
        #[arg(long)]
        doc_type: Option<String>,
    },
    /// Submit a response document to the local connector and exit.
    SendResponse {
        /// Document file to submit instead of the built-in default.
        #[arg(short, long, value_name = "FILE")]
        file: Option<String>,
        #[arg(long)]
        sender: Option<String>,
        #[arg(long)]
        receiver: Option<String>,
        #[arg(long)]
        doc_type: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt::try_init();

    info!("Started configurable-simulator");

    let args = SimulatorArgs::parse();
    let mut file = File::open(args.config)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    let config: Config = json5::from_str(&contents)?;

    match args.command {
        Some(SimulatorCommand::SendRequest {
            file,
            sender,
            receiver,
            doc_type,
        }) => {
            commands::send_request(
                &config,
                SendOverrides {
                    file,
                    sender,
                    receiver,
                    doc_type,
                },
            )
            .await
        }
        Some(SimulatorCommand::SendResponse {
            file,
            sender,
            receiver,
            doc_type,
        }) => {
            commands::send_response(
                &config,
                SendOverrides {
                    file,
                    sender,
                    receiver,
                    doc_type,
                },
            )
            .await
        }
        None => serve(config).await,
    }
}

/// Builds the engine and router and serves the simulator endpoints until the
/// process is stopped. A capability dataset that fails to load aborts startup.
async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let source = CapabilityStaticFile::new(config.capability_config.file_path.clone());
    let engine = Arc::new(DiscoveryEngine::load(&source).await?);

    let simulator = &config.simulator_config;
    let context = RoutingContext {
        mode: simulator.mode,
        dc_endpoint: simulator.dc_endpoint.clone(),
        dp_endpoint: simulator.dp_endpoint.clone(),
        auto_respond: simulator.auto_respond,
    };
    info!(
        "simulator mode {} (auto-respond {}), dc endpoint {}, dp endpoint {}",
        simulator.mode, simulator.auto_respond, simulator.dc_endpoint, simulator.dp_endpoint
    );

    let document_model = Arc::new(XmlDocumentModel::new());
    let responder = Arc::new(CannedResponder::new());
    let gateway = Arc::new(HttpSubmissionGateway::new());
    let router = Arc::new(ExchangeRouter::new(
        context,
        document_model.clone(),
        responder.clone(),
        gateway.clone(),
    ));

    let state = Arc::new(web::AppState {
        engine,
        router,
        document_model,
        responder,
        gateway,
        connector_port: simulator.connector_port,
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", simulator.listen_port)).await?;
    info!("listening on port {}", simulator.listen_port);
    axum::serve(listener, web::app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
