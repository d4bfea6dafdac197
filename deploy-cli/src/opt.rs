// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::args::max_fee_per_gas::MaxFeePerGasParam;
use clap::Parser;
use color_eyre::Result;
use deploy_logging::{LogFormat, LogOutputDest};
use std::path::PathBuf;
use std::time::Duration;

/// The contract deployed when none is named.
pub(crate) const DEFAULT_CONTRACT: &str = "PaywithBTCWithEncryption";

// Please do not remove the blank lines in these doc comments.
// They are used for inserting line breaks when the help menu is rendered.

#[derive(Parser, Debug)]
#[command(disable_version_flag = true)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Opt {
    /// The contract to deploy.
    ///
    /// Either a bare contract name ("Token") or a fully qualified name
    /// ("contracts/Token.sol:Token") when the bare name is ambiguous.
    #[clap(env = "DEPLOY_CONTRACT", default_value = DEFAULT_CONTRACT, verbatim_doc_comment)]
    pub contract: String,

    /// Constructor arguments, in the order the constructor declares them.
    #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// The directory holding the compiled contract artifacts.
    #[clap(long, env = "ARTIFACTS_DIR", default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Print the crate version.
    #[clap(long)]
    pub crate_version: bool,

    /// Specify the logging format.
    ///
    /// Valid values are "default" or "json".
    ///
    /// If the argument is not used, the default format will be applied.
    #[clap(long, value_parser = LogFormat::parse_from_str, verbatim_doc_comment)]
    pub log_format: Option<LogFormat>,

    /// Specify the logging output destination.
    ///
    /// Valid values are "stdout", "stderr", "data-dir", or a custom path.
    ///
    /// `data-dir` is the default value.
    ///
    /// The data directory location is platform specific:
    ///  - Linux: $HOME/.local/share/contract-deployer/logs
    ///  - macOS: $HOME/Library/Application Support/contract-deployer/logs
    ///  - Windows: C:\Users\<username>\AppData\Roaming\contract-deployer\logs
    #[allow(rustdoc::invalid_html_tags)]
    #[clap(long, value_parser = LogOutputDest::parse_from_str, verbatim_doc_comment, default_value = "data-dir"
    )]
    pub log_output_dest: LogOutputDest,

    /// Specify the maximum number of rotated log files to keep when logging to a directory.
    ///
    /// Defaults to 10.
    #[clap(long, verbatim_doc_comment)]
    pub max_log_files: Option<usize>,

    /// Max fee per gas / gas price bid for the deployment transaction.
    ///
    /// Valid values are:
    ///  - "low": the average fee of a known public network
    ///  - "market": a few times the average fee of a known public network (default on public networks)
    ///  - "auto": whatever the node suggests (default on local and custom networks)
    ///  - "limited-auto:<WEI>": whatever the node suggests, capped at the given amount
    ///  - "unlimited": no cap at all
    ///  - "<WEI>": a fixed amount
    #[allow(rustdoc::invalid_html_tags)]
    #[clap(long, verbatim_doc_comment)]
    pub max_fee_per_gas: Option<MaxFeePerGasParam>,

    /// The EVM network to deploy to.
    ///
    /// Valid values are "localhost", "arbitrum-one", "arbitrum-sepolia", "ephemeral" (a throwaway
    /// Anvil node started for this run) or an http(s) RPC URL.
    ///
    /// Falls back to the EVM_NETWORK and RPC_URL environment variables, then to localhost.
    #[clap(long, verbatim_doc_comment)]
    pub network: Option<String>,

    /// The maximum duration in seconds to wait for the deployment to be confirmed.
    ///
    /// Waits indefinitely when not set.
    #[clap(long = "timeout", value_parser = |t: &str| -> Result<Duration> { Ok(t.parse().map(Duration::from_secs)?) }
    )]
    pub confirmation_timeout: Option<Duration>,

    /// Print version information.
    #[clap(long)]
    pub version: bool,
}
