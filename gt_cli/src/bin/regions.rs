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

//! Region-management CLI: list, show, and delete entries in the Region Store.

use clap::{Parser, Subcommand};
use gt_store::region::RegionStore;

#[derive(Parser, Debug)]
#[command(about = "inspect and manage the region store")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// list known regions
    List {
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        has_lidar_only: bool,
    },
    /// print a region's metadata.txt
    Show { slug: String },
    /// delete a region's input and output trees
    Delete { slug: String },
}

fn main() {
    gt_build::set_bin_context!();
    gt_cli::init_tracing();

    let args = Args::parse();
    let store = match RegionStore::open(gt_build::root_dir()) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to open region store");
            std::process::exit(1);
        }
    };

    match args.command {
        Command::List { source, has_lidar_only } => match store.list_regions(source.as_deref(), has_lidar_only) {
            Ok(regions) => {
                for r in regions {
                    println!("{}\t{}\tlidar={}", r.name, r.source_type, r.has_lidar);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to list regions");
                std::process::exit(1);
            }
        },
        Command::Show { slug } => match store.read_metadata(&slug) {
            Ok(Some(metadata)) => println!("{}", metadata.to_text()),
            Ok(None) => {
                eprintln!("no metadata for region '{slug}'");
                std::process::exit(1);
            }
            Err(e) => {
                tracing::error!(error = %e, region = %slug, "failed to read metadata");
                std::process::exit(1);
            }
        },
        Command::Delete { slug } => {
            if let Err(e) = store.delete_region(&slug) {
                tracing::error!(error = %e, region = %slug, "failed to delete region");
                std::process::exit(1);
            }
            println!("deleted region '{slug}'");
        }
    }
}
