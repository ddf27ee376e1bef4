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

//! Pipeline-only CLI: re-derives the fixed terrain-product family from an elevation
//! raster already sitting on disk, without going through the Acquisition Orchestrator.

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use gt_pipeline::settings::Settings;
use gt_store::region::RegionStore;

#[derive(Parser, Debug)]
#[command(about = "run the terrain pipeline against an existing elevation raster")]
struct Args {
    /// path to the source elevation GeoTIFF
    #[arg(long)]
    elevation: PathBuf,

    /// region slug to write products under (e.g. "45.52N_122.68W")
    #[arg(long)]
    region: String,
}

fn main() {
    gt_build::set_bin_context!();
    gt_cli::init_tracing();

    let args = Args::parse();
    let settings = Settings::load_or_default();

    let store = match RegionStore::open(gt_build::root_dir()) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to open region store");
            std::process::exit(1);
        }
    };

    let sink: gt_pipeline::OrchestratorSink = Arc::new(|event| {
        tracing::info!(region = %event.region_name, event = ?event.event, "progress");
    });

    let report = gt_pipeline::pipeline::run_pipeline(&args.elevation, &store, &args.region, &settings, "manual", &sink);

    println!("{}/{} tasks succeeded", report.successful, report.total);
    for (task, error) in &report.failures {
        eprintln!("  {task}: {error}");
    }

    if report.successful < report.total {
        std::process::exit(1);
    }
}
