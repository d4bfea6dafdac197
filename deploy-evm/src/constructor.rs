// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::artifacts::{self, Artifact};
use crate::common::Bytes;
use alloy::dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier};
use alloy::json_abi::JsonAbi;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Expected {expected} constructor argument(s) but {given} were given")]
    ArgumentCount { expected: usize, given: usize },
    #[error("Constructor argument {index} ({name}: {ty}) is invalid: {source}")]
    InvalidArgument {
        index: usize,
        name: String,
        ty: String,
        #[source]
        source: alloy::dyn_abi::Error,
    },
    #[error("Failed to encode constructor arguments: {0}")]
    Encoding(#[source] alloy::dyn_abi::Error),
    #[error(transparent)]
    Artifact(#[from] artifacts::Error),
}

/// Parse the raw command line values into the types the constructor expects.
///
/// Values use the usual Solidity literal syntax: `0x..` for addresses and bytes, decimal or
/// hex for integers, `[a,b]` for arrays and `(a,b)` for tuples.
pub fn parse_constructor_args(abi: &JsonAbi, raw: &[String]) -> Result<Vec<DynSolValue>, Error> {
    let inputs = abi
        .constructor()
        .map(|constructor| constructor.inputs.as_slice())
        .unwrap_or_default();

    if inputs.len() != raw.len() {
        return Err(Error::ArgumentCount {
            expected: inputs.len(),
            given: raw.len(),
        });
    }

    inputs
        .iter()
        .zip(raw)
        .enumerate()
        .map(|(index, (param, value))| {
            let invalid = |source| Error::InvalidArgument {
                index,
                name: param.name.clone(),
                ty: param.selector_type().into_owned(),
                source,
            };
            let ty: DynSolType = param.resolve().map_err(invalid)?;
            ty.coerce_str(value).map_err(invalid)
        })
        .collect()
}

/// The input of a deployment transaction: creation code followed by the encoded constructor
/// arguments.
pub fn encode_deploy_code(artifact: &Artifact, args: &[DynSolValue]) -> Result<Bytes, Error> {
    let creation_code = artifact.creation_code()?;

    let Some(constructor) = artifact.abi.constructor() else {
        if !args.is_empty() {
            return Err(Error::ArgumentCount {
                expected: 0,
                given: args.len(),
            });
        }
        return Ok(creation_code);
    };

    let encoded_args = constructor.abi_encode_input(args).map_err(Error::Encoding)?;
    debug!(
        "Encoded {} constructor argument(s) into {} bytes for {}",
        args.len(),
        encoded_args.len(),
        artifact.contract_name
    );

    let mut deploy_code = creation_code.to_vec();
    deploy_code.extend_from_slice(&encoded_args);
    Ok(deploy_code.into())
}
