/*
 * Copyright (c) 2024, United States Government, as represented by the
 * Administrator of the National Aeronautics and Space Administration.
 * All rights reserved.
 *
 * The ODIN - Open Data Integration Framework is licensed under the
 * Apache License, Version 2.0 (the "License"); you may not use this file
 * except in compliance with the License. You may obtain a copy of the
 * License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! One-shot acquisition CLI: `acquire --lat 45.52 --lng -122.68 --buffer-km 5.0`.
//! Runs `Orchestrator::acquire`, prints each progress event, and reports the final
//! `AcquisitionResult` as JSON.

use std::sync::Arc;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "acquire elevation data for a coordinate and run the terrain pipeline")]
struct Args {
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    lng: f64,

    #[arg(long, default_value_t = 5.0)]
    buffer_km: f64,

    /// restrict routing to these adapter names (comma-separated), e.g. "opentopography,usgs_3dep"
    #[arg(long, value_delimiter = ',')]
    sources: Option<Vec<String>>,
}

#[tokio::main]
async fn main() {
    gt_build::set_bin_context!();
    gt_cli::init_tracing();

    let args = Args::parse();

    let orchestrator = match gt_cli::build_orchestrator() {
        Ok(o) => o,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize orchestrator");
            std::process::exit(1);
        }
    };

    let sink: gt_pipeline::OrchestratorSink = Arc::new(|event| {
        tracing::info!(download_id = %event.download_id, region = %event.region_name, event = ?event.event, "progress");
    });

    let result = orchestrator.acquire(args.lat, args.lng, args.buffer_km, args.sources, sink).await;

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{json}"),
        Err(_) => println!("{result:?}"),
    }

    if !result.success {
        std::process::exit(1);
    }
}
