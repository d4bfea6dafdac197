// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

#[macro_use]
extern crate tracing;

mod actions;
mod args;
mod evm_network;
mod opt;

use clap::Parser;
use color_eyre::Result;
use deploy_logging::{Level, LogBuilder, ReloadHandle, WorkerGuard};
use opt::Opt;

/// Every failure collapses to this status.
const DEPLOYMENT_FAILED_EXIT_CODE: i32 = 1;

#[tokio::main]
async fn main() {
    if let Err(err) = color_eyre::install() {
        eprintln!("Failed to initialise error handler: {err}");
    }

    let opt = Opt::parse();

    if opt.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return;
    }

    if opt.crate_version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let log_guards = match init_logging(&opt) {
        Ok(guards) => guards,
        Err(err) => {
            eprintln!("{err:?}");
            std::process::exit(DEPLOYMENT_FAILED_EXIT_CODE);
        }
    };

    info!("Deploying {} with args {:?}", opt.contract, opt.args);
    if let Err(err) = actions::deploy_contract(&opt).await {
        error!("Deployment failed: {err:?}");
        eprintln!("{err:?}");
        // exit skips destructors, flush the log appender first
        drop(log_guards);
        std::process::exit(DEPLOYMENT_FAILED_EXIT_CODE);
    }
}

fn init_logging(opt: &Opt) -> Result<(ReloadHandle, Option<WorkerGuard>)> {
    let logging_targets = vec![
        ("deploy".to_string(), Level::DEBUG),
        ("deploy_evm".to_string(), Level::DEBUG),
        ("deploy_logging".to_string(), Level::DEBUG),
    ];
    let mut log_builder = LogBuilder::new(logging_targets);
    log_builder.output_dest(opt.log_output_dest.clone());
    log_builder.format(opt.log_format.unwrap_or(deploy_logging::LogFormat::Default));
    if let Some(files) = opt.max_log_files {
        log_builder.max_log_files(files);
    }
    log_builder.print_updates_to_stdout(false);
    let guards = log_builder.initialize()?;
    Ok(guards)
}
