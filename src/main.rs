// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::{Parser, Subcommand};
use cnquery::commands::detect::{DetectCommand, DetectTarget};
use cnquery::commands::tree::TreeCommand;
use cnquery::config::new_detection_config;
use cnquery::error::{Result, format_error_chain, get_exit_code};
use cnquery::logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cnquery")]
#[command(author, version, about = "Platform detection for hosts and images", long_about = None)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the platform of the local machine or an image
    #[command(visible_alias = "d")]
    Detect {
        /// Exported filesystem tar, plain or gzip-compressed
        #[arg(long, value_name = "PATH", conflicts_with_all = ["fs", "recording"])]
        tar: Option<PathBuf>,

        /// Treat the tar as a container image
        #[arg(long, requires = "tar")]
        image: bool,

        /// Unpacked image root directory
        #[arg(long, value_name = "DIR", conflicts_with = "recording")]
        fs: Option<PathBuf>,

        /// Replay a recorded target (TOML)
        #[arg(long, value_name = "FILE")]
        recording: Option<PathBuf>,

        /// Architecture declared by the image manifest
        #[arg(long, value_name = "ARCH")]
        arch: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show the resolver tree in detection order
    Tree,
}

fn setup_logger(cli: &Cli) {
    logging::setup_logger(cli.verbose);
}

fn main() {
    let cli = Cli::parse();

    setup_logger(&cli);

    let config = match new_detection_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_error_chain(&e));
            std::process::exit(get_exit_code(&e));
        }
    };

    let result: Result<()> = (|| match cli.command {
        Commands::Detect {
            tar,
            image,
            fs,
            recording,
            arch,
            json,
        } => {
            let target = match (tar, fs, recording) {
                (Some(path), _, _) => DetectTarget::Tar {
                    path,
                    arch,
                    container_image: image,
                },
                (None, Some(root), _) => DetectTarget::Filesystem { root, arch },
                (None, None, Some(path)) => DetectTarget::Recording(path),
                (None, None, None) => DetectTarget::Local,
            };
            let command = DetectCommand::new(&config)?;
            command.execute(&target, json)
        }
        Commands::Tree => {
            let command = TreeCommand::new()?;
            command.execute()
        }
    })();

    if let Err(e) = result {
        eprintln!("{}", format_error_chain(&e));
        std::process::exit(get_exit_code(&e));
    }
}
