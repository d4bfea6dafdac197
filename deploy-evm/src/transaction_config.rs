// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::common::Wei;
use alloy::providers::Provider;
use alloy::transports::{RpcError, TransportErrorKind};
use std::time::Duration;

#[derive(Clone, Debug, Default)]
pub struct TransactionConfig {
    pub max_fee_per_gas: MaxFeePerGas,
    /// How long to wait for the deployment to be confirmed. `None` waits indefinitely.
    pub confirmation_timeout: Option<Duration>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MaxFeePerGas {
    /// Use the current market price for fee per gas. WARNING: This can result in unexpected high gas fees!
    #[default]
    Auto,
    /// Use the current market price for fee per gas, but with an upper limit.
    LimitedAuto(Wei),
    /// Use no max fee per gas. WARNING: This can result in unexpected high gas fees!
    Unlimited,
    /// Use a custom max fee per gas in WEI.
    Custom(Wei),
}

/// Explicit EIP-1559 fee fields for a transaction.
///
/// The provider's gas filler only keeps these when both are set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasFees {
    pub max_fee_per_gas: Wei,
    pub max_priority_fee_per_gas: Wei,
}

impl MaxFeePerGas {
    /// The explicit fees to put on the transaction, if any.
    ///
    /// `None` leaves the fees to the provider's gas filler.
    pub async fn resolve<P: Provider>(
        &self,
        provider: &P,
    ) -> Result<Option<GasFees>, RpcError<TransportErrorKind>> {
        if matches!(self, MaxFeePerGas::Auto | MaxFeePerGas::Unlimited) {
            return Ok(None);
        }

        let estimate = provider.estimate_eip1559_fees().await?;
        debug!(
            "Estimated max fee per gas {} wei, priority fee {} wei",
            estimate.max_fee_per_gas, estimate.max_priority_fee_per_gas
        );
        Ok(self.fees_from_estimate(estimate.max_fee_per_gas, estimate.max_priority_fee_per_gas))
    }

    fn fees_from_estimate(&self, market_max_fee: Wei, market_priority_fee: Wei) -> Option<GasFees> {
        let max_fee_per_gas = match self {
            MaxFeePerGas::Auto | MaxFeePerGas::Unlimited => return None,
            MaxFeePerGas::Custom(fee) => *fee,
            MaxFeePerGas::LimitedAuto(limit) => Self::cap(market_max_fee, *limit),
        };

        // the tip can never exceed the max fee
        Some(GasFees {
            max_fee_per_gas,
            max_priority_fee_per_gas: market_priority_fee.min(max_fee_per_gas),
        })
    }

    fn cap(market: Wei, limit: Wei) -> Wei {
        if market > limit {
            warn!("Market gas price {market} exceeds the limit of {limit}, capping it");
            limit
        } else {
            market
        }
    }
}
