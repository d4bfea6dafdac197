// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use color_eyre::Help;
use deploy_evm::common::Wei;
use deploy_evm::{MaxFeePerGas, Network};

/// Multiple of the network's average fee that still counts as the going market rate.
const MARKET_FEE_MULTIPLIER: Wei = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MaxFeePerGasParam {
    Low,
    Market,
    Auto,
    LimitedAuto(Wei),
    Unlimited,
    Custom(Wei),
}

impl MaxFeePerGasParam {
    fn get_network_average_gas_fee(network: &Network) -> color_eyre::Result<Wei> {
        network.average_gas_fee().ok_or_else(|| {
            color_eyre::eyre::eyre!(
                "`--max-fee-per-gas` options `low` and `market` are not supported on {network}."
            )
            .with_suggestion(|| "Try using a different `--max-fee-per-gas` option, such as `auto`, `limited-auto:<WEI AMOUNT>`, `unlimited`, or a custom value specified in WEI.")
        })
    }
}

impl std::str::FromStr for MaxFeePerGasParam {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_ascii_lowercase();

        match s.as_str() {
            "low" => Ok(MaxFeePerGasParam::Low),
            "market" => Ok(MaxFeePerGasParam::Market),
            "auto" => Ok(MaxFeePerGasParam::Auto),
            "unlimited" => Ok(MaxFeePerGasParam::Unlimited),
            _ => {
                if let Some(rest) = s.strip_prefix("limited-auto:") {
                    rest.parse::<Wei>()
                        .map(MaxFeePerGasParam::LimitedAuto)
                        .map_err(|_| format!("Invalid limited-auto value: {rest}"))
                } else {
                    s.parse::<Wei>()
                        .map(MaxFeePerGasParam::Custom)
                        .map_err(|_| format!("Invalid custom value: {s}"))
                }
            }
        }
    }
}

impl std::fmt::Display for MaxFeePerGasParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Market => write!(f, "market"),
            Self::Auto => write!(f, "auto"),
            Self::LimitedAuto(value) => write!(f, "limited-auto:{value}"),
            Self::Unlimited => write!(f, "unlimited"),
            Self::Custom(value) => write!(f, "{value}"),
        }
    }
}

/// Known public networks default to a capped market price, development and custom networks to
/// whatever the node suggests.
pub fn get_max_fee_per_gas_from_opt_param(
    param: Option<MaxFeePerGasParam>,
    network: &Network,
) -> color_eyre::Result<MaxFeePerGas> {
    let param = match (param, network.average_gas_fee()) {
        (Some(p), _) => p,
        (None, Some(_)) => MaxFeePerGasParam::Market,
        (None, None) => MaxFeePerGasParam::Auto,
    };

    match param {
        MaxFeePerGasParam::Low => Ok(MaxFeePerGas::LimitedAuto(
            MaxFeePerGasParam::get_network_average_gas_fee(network)?,
        )),
        MaxFeePerGasParam::Market => Ok(MaxFeePerGas::LimitedAuto(
            MaxFeePerGasParam::get_network_average_gas_fee(network)? * MARKET_FEE_MULTIPLIER,
        )),
        MaxFeePerGasParam::Auto => Ok(MaxFeePerGas::Auto),
        MaxFeePerGasParam::LimitedAuto(value) => Ok(MaxFeePerGas::LimitedAuto(value)),
        MaxFeePerGasParam::Unlimited => Ok(MaxFeePerGas::Unlimited),
        MaxFeePerGasParam::Custom(value) => Ok(MaxFeePerGas::Custom(value)),
    }
}
