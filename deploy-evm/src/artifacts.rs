// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Lookup of compiled contract artifacts by contract name.
//!
//! Both Hardhat (`artifacts/contracts/Foo.sol/Foo.json`) and Foundry (`out/Foo.sol/Foo.json`)
//! layouts are understood. A contract can be requested by its bare name (`Foo`) or by its fully
//! qualified name (`contracts/Foo.sol:Foo`) when the bare name is ambiguous.

use crate::common::Bytes;
use alloy::json_abi::JsonAbi;
use alloy::primitives::hex;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const BUILD_INFO_DIR: &str = "build-info";
const DEBUG_FILE_SUFFIX: &str = ".dbg.json";
const MAX_SUGGESTIONS: usize = 3;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Artifacts directory {0:?} does not exist, compile your contracts first")]
    MissingArtifactsDir(PathBuf),
    #[error("Artifact for contract {name:?} not found{}", suggestion_hint(.suggestions))]
    NotFound {
        name: String,
        suggestions: Vec<String>,
    },
    #[error("There are multiple artifacts for contract {name:?}, please use a fully qualified name instead: {}", .candidates.join(", "))]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },
    #[error("Contract {0:?} is abstract and can't be deployed")]
    AbstractContract(String),
    #[error("Contract {contract:?} is missing links for the following libraries: {}", .libraries.join(", "))]
    UnlinkedLibraries {
        contract: String,
        libraries: Vec<String>,
    },
    #[error("Invalid bytecode in artifact {0:?}: {1}")]
    InvalidBytecode(PathBuf, hex::FromHexError),
    #[error("Failed to read artifact {0:?}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse artifact {0:?}: {1}")]
    Json(PathBuf, #[source] serde_json::Error),
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),
}

fn suggestion_hint(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(", did you mean {}?", suggestions.join(" or "))
    }
}

type LinkReferences = BTreeMap<String, BTreeMap<String, serde_json::Value>>;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: Option<String>,
    source_name: Option<String>,
    abi: JsonAbi,
    bytecode: RawBytecode,
    #[serde(default)]
    link_references: LinkReferences,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// Hardhat stores the creation code as a plain hex string.
    Hex(String),
    /// Foundry nests it together with its link references.
    #[serde(rename_all = "camelCase")]
    Object {
        object: String,
        #[serde(default)]
        link_references: LinkReferences,
    },
}

/// A compiled contract: its ABI plus the creation code needed to deploy it.
#[derive(Clone, Debug)]
pub struct Artifact {
    pub contract_name: String,
    pub source_name: String,
    pub abi: JsonAbi,
    pub path: PathBuf,
    bytecode: String,
    libraries: Vec<String>,
}

impl Artifact {
    /// Parse an artifact file. Names missing from the file are derived from its location, i.e.
    /// `<source>/<ContractName>.json` relative to the artifacts root.
    pub fn from_file(path: &Path, root: &Path) -> Result<Self, Error> {
        let contents =
            std::fs::read_to_string(path).map_err(|err| Error::Io(path.to_path_buf(), err))?;
        Self::from_json(&contents, path, root)
    }

    pub fn from_json(contents: &str, path: &Path, root: &Path) -> Result<Self, Error> {
        let raw: RawArtifact =
            serde_json::from_str(contents).map_err(|err| Error::Json(path.to_path_buf(), err))?;

        let contract_name = raw
            .contract_name
            .unwrap_or_else(|| file_stem(path).to_string());
        let source_name = raw
            .source_name
            .unwrap_or_else(|| relative_source_name(path, root));

        let (bytecode, link_references) = match raw.bytecode {
            RawBytecode::Hex(hex) => (hex, raw.link_references),
            RawBytecode::Object {
                object,
                link_references,
            } => (object, link_references),
        };

        let libraries = link_references
            .iter()
            .flat_map(|(source, libs)| libs.keys().map(move |lib| format!("{source}:{lib}")))
            .collect();

        Ok(Self {
            contract_name,
            source_name,
            abi: raw.abi,
            path: path.to_path_buf(),
            bytecode,
            libraries,
        })
    }

    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// Interfaces and abstract contracts compile to empty creation code.
    pub fn is_abstract(&self) -> bool {
        self.bytecode.trim_start_matches("0x").is_empty()
    }

    /// Library addresses are left as `__$<hash>$__` placeholders until they are linked.
    pub fn has_unlinked_libraries(&self) -> bool {
        self.bytecode.contains("__")
    }

    /// The libraries this contract needs linked before it can be deployed.
    pub fn libraries(&self) -> &[String] {
        &self.libraries
    }

    /// The creation code of the contract, without constructor arguments.
    pub fn creation_code(&self) -> Result<Bytes, Error> {
        if self.is_abstract() {
            return Err(Error::AbstractContract(self.contract_name.clone()));
        }

        if self.has_unlinked_libraries() {
            return Err(Error::UnlinkedLibraries {
                contract: self.contract_name.clone(),
                libraries: self.libraries.clone(),
            });
        }

        hex::decode(&self.bytecode)
            .map(Bytes::from)
            .map_err(|err| Error::InvalidBytecode(self.path.clone(), err))
    }
}

/// The directory a Solidity toolchain writes its artifacts to.
#[derive(Clone, Debug)]
pub struct ArtifactRegistry {
    root: PathBuf,
}

impl ArtifactRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// All artifact files below the root, sorted. Debug files and build info are skipped.
    pub fn artifact_paths(&self) -> Result<Vec<PathBuf>, Error> {
        if !self.root.is_dir() {
            return Err(Error::MissingArtifactsDir(self.root.clone()));
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != BUILD_INFO_DIR)
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if file_name.ends_with(".json") && !file_name.ends_with(DEBUG_FILE_SUFFIX) {
                paths.push(entry.into_path());
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Look up the artifact for a bare or fully qualified contract name.
    pub fn get_artifact(&self, name: &str) -> Result<Artifact, Error> {
        let (source, contract_name) = match name.rsplit_once(':') {
            Some((source, contract_name)) => (Some(source), contract_name),
            None => (None, name),
        };

        let paths = self.artifact_paths()?;
        debug!(
            "Searching {} artifact(s) in {:?} for {name:?}",
            paths.len(),
            self.root
        );

        let mut matches = Vec::new();
        for path in paths.iter().filter(|path| file_stem(path) == contract_name) {
            let artifact = match Artifact::from_file(path, &self.root) {
                Ok(artifact) => artifact,
                Err(err) => {
                    warn!("Skipping {path:?}, it is not a contract artifact: {err}");
                    continue;
                }
            };
            if source.map_or(true, |source| artifact.source_name == source) {
                matches.push(artifact);
            }
        }

        match matches.len() {
            0 => {
                let suggestions = suggestions(&paths, contract_name);
                warn!("No artifact found for {name:?}, suggestions: {suggestions:?}");
                Err(Error::NotFound {
                    name: name.to_string(),
                    suggestions,
                })
            }
            1 => {
                let artifact = matches.remove(0);
                info!(
                    "Resolved {name:?} to {} at {:?}",
                    artifact.fully_qualified_name(),
                    artifact.path
                );
                Ok(artifact)
            }
            _ => Err(Error::Ambiguous {
                name: name.to_string(),
                candidates: matches
                    .iter()
                    .map(Artifact::fully_qualified_name)
                    .collect(),
            }),
        }
    }
}

fn file_stem(path: &Path) -> &str {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
}

/// `contracts/Foo.sol` for `<root>/contracts/Foo.sol/Foo.json`.
fn relative_source_name(path: &Path, root: &Path) -> String {
    let parent = path.parent().unwrap_or(path);
    let relative = parent.strip_prefix(root).unwrap_or(parent);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Contract names that differ from the requested one only by case or by a prefix/suffix.
fn suggestions(paths: &[PathBuf], name: &str) -> Vec<String> {
    let wanted = name.to_lowercase();
    let names: BTreeSet<String> = paths
        .iter()
        .map(|path| file_stem(path).to_string())
        .filter(|candidate| {
            let candidate = candidate.to_lowercase();
            !wanted.is_empty() && (candidate.contains(&wanted) || wanted.contains(&candidate))
        })
        .collect();
    names.into_iter().take(MAX_SUGGESTIONS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MINIMAL_CREATION_CODE: &str = "0x6001600c60003960016000f300";

    fn hardhat_artifact(name: &str, source: &str, bytecode: &str) -> String {
        serde_json::json!({
            "_format": "hh-sol-artifact-1",
            "contractName": name,
            "sourceName": source,
            "abi": [],
            "bytecode": bytecode,
            "deployedBytecode": "0x00",
            "linkReferences": {},
            "deployedLinkReferences": {}
        })
        .to_string()
    }

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("artifact has a parent")).expect("mkdir");
        fs::write(path, contents).expect("write artifact");
    }

    fn registry_with(files: &[(&str, String)]) -> (TempDir, ArtifactRegistry) {
        let dir = TempDir::new().expect("tempdir");
        for (relative, contents) in files {
            write(dir.path(), relative, contents);
        }
        let registry = ArtifactRegistry::new(dir.path());
        (dir, registry)
    }

    #[test]
    fn resolves_a_contract_by_its_bare_name() {
        let (_dir, registry) = registry_with(&[
            (
                "contracts/Token.sol/Token.json",
                hardhat_artifact("Token", "contracts/Token.sol", MINIMAL_CREATION_CODE),
            ),
            (
                "contracts/Token.sol/Token.dbg.json",
                r#"{"_format":"hh-sol-dbg-1","buildInfo":"../../build-info/x.json"}"#.to_string(),
            ),
            ("build-info/Token.json", "{}".to_string()),
        ]);

        let artifact = registry.get_artifact("Token").expect("artifact exists");
        assert_eq!(artifact.fully_qualified_name(), "contracts/Token.sol:Token");
        assert_eq!(artifact.creation_code().expect("linked").len(), 13);
    }

    #[test]
    fn ambiguous_names_require_a_fully_qualified_name() {
        let (_dir, registry) = registry_with(&[
            (
                "contracts/a/Vault.sol/Vault.json",
                hardhat_artifact("Vault", "contracts/a/Vault.sol", MINIMAL_CREATION_CODE),
            ),
            (
                "contracts/b/Vault.sol/Vault.json",
                hardhat_artifact("Vault", "contracts/b/Vault.sol", MINIMAL_CREATION_CODE),
            ),
        ]);

        match registry.get_artifact("Vault") {
            Err(Error::Ambiguous { candidates, .. }) => assert_eq!(
                candidates,
                vec![
                    "contracts/a/Vault.sol:Vault".to_string(),
                    "contracts/b/Vault.sol:Vault".to_string()
                ]
            ),
            other => panic!("expected an ambiguity error, got {other:?}"),
        }

        let artifact = registry
            .get_artifact("contracts/b/Vault.sol:Vault")
            .expect("fully qualified name is unique");
        assert_eq!(artifact.source_name, "contracts/b/Vault.sol");
    }

    #[test]
    fn unknown_contracts_are_reported_with_suggestions() {
        let (_dir, registry) = registry_with(&[(
            "contracts/Token.sol/MyToken.json",
            hardhat_artifact("MyToken", "contracts/Token.sol", MINIMAL_CREATION_CODE),
        )]);

        let err = registry.get_artifact("token").expect_err("no such contract");
        assert!(matches!(&err, Error::NotFound { suggestions, .. } if suggestions == &["MyToken".to_string()]));
        assert_eq!(
            err.to_string(),
            "Artifact for contract \"token\" not found, did you mean MyToken?"
        );
    }

    #[test]
    fn contracts_in_several_sources_are_suggested_once() {
        let (_dir, registry) = registry_with(&[
            (
                "contracts/a/Vault.sol/Vault.json",
                hardhat_artifact("Vault", "contracts/a/Vault.sol", MINIMAL_CREATION_CODE),
            ),
            (
                "contracts/b/Vault.sol/Vault.json",
                hardhat_artifact("Vault", "contracts/b/Vault.sol", MINIMAL_CREATION_CODE),
            ),
        ]);

        match registry.get_artifact("vault") {
            Err(Error::NotFound { suggestions, .. }) => {
                assert_eq!(suggestions, vec!["Vault".to_string()])
            }
            other => panic!("expected a not found error, got {other:?}"),
        }
    }

    #[test]
    fn unrelated_json_files_do_not_break_the_lookup() {
        let (_dir, registry) = registry_with(&[
            ("cache/Token.json", r#"{"solcVersion":"0.8.24"}"#.to_string()),
            ("contracts/Broken.sol/Token.json", "{ not json".to_string()),
            (
                "contracts/Token.sol/Token.json",
                hardhat_artifact("Token", "contracts/Token.sol", MINIMAL_CREATION_CODE),
            ),
        ]);

        let artifact = registry.get_artifact("Token").expect("the real artifact is found");
        assert_eq!(artifact.fully_qualified_name(), "contracts/Token.sol:Token");
    }

    #[test]
    fn missing_artifacts_directory_is_an_error() {
        let registry = ArtifactRegistry::new("/definitely/not/here/artifacts");
        assert!(matches!(
            registry.get_artifact("Token"),
            Err(Error::MissingArtifactsDir(_))
        ));
    }

    #[test]
    fn foundry_artifacts_derive_names_from_their_location() {
        let foundry = serde_json::json!({
            "abi": [],
            "bytecode": { "object": MINIMAL_CREATION_CODE, "linkReferences": {} },
            "deployedBytecode": { "object": "0x00" }
        })
        .to_string();
        let (_dir, registry) = registry_with(&[("Counter.sol/Counter.json", foundry)]);

        let artifact = registry.get_artifact("Counter").expect("artifact exists");
        assert_eq!(artifact.fully_qualified_name(), "Counter.sol:Counter");
        assert!(!artifact.is_abstract());
    }

    #[test]
    fn interfaces_cannot_be_deployed() {
        let (_dir, registry) = registry_with(&[(
            "contracts/IToken.sol/IToken.json",
            hardhat_artifact("IToken", "contracts/IToken.sol", "0x"),
        )]);

        let artifact = registry.get_artifact("IToken").expect("artifact exists");
        assert!(artifact.is_abstract());
        assert!(matches!(
            artifact.creation_code(),
            Err(Error::AbstractContract(name)) if name == "IToken"
        ));
    }

    #[test]
    fn unlinked_libraries_are_listed() {
        let mut artifact: serde_json::Value = serde_json::from_str(&hardhat_artifact(
            "Exchange",
            "contracts/Exchange.sol",
            "0x73__$2a9b2d8d5e2c0b5f5c3b35e0b4f28f1a42$__63",
        ))
        .expect("valid json");
        artifact["linkReferences"] = serde_json::json!({
            "contracts/Math.sol": { "Math": [{ "length": 20, "start": 1 }] }
        });
        let (_dir, registry) = registry_with(&[(
            "contracts/Exchange.sol/Exchange.json",
            artifact.to_string(),
        )]);

        let artifact = registry.get_artifact("Exchange").expect("artifact exists");
        assert!(artifact.has_unlinked_libraries());
        match artifact.creation_code() {
            Err(Error::UnlinkedLibraries { libraries, .. }) => {
                assert_eq!(libraries, vec!["contracts/Math.sol:Math".to_string()])
            }
            other => panic!("expected unlinked libraries, got {other:?}"),
        }
    }
}
