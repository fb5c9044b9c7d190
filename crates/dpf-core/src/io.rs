// crates/dpf-core/src/io.rs

//! Dual JSON/CBOR (de)serialization of a [`Key`], with field names
//! normative per the external-interfaces contract: `root`,
//! `correction_words`, `correction_advice`, `leaves`, `wildcards`,
//! `beavers`. Extension-based format auto-detection follows the
//! `read_*_auto`/`write_*_auto` convention.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::block::Block;
use crate::key::{Beaver, Key, LeafLayer};
use crate::leaf::LeafBlock;
use crate::output::Output;
use crate::tree::Tree;

#[derive(Clone, Copy, Serialize, Deserialize)]
struct WireBlock(u64, u64);

impl From<Block> for WireBlock {
    fn from(b: Block) -> Self {
        let v = b.as_u128();
        Self((v & 0xFFFF_FFFF_FFFF_FFFF) as u64, (v >> 64) as u64)
    }
}

impl From<WireBlock> for Block {
    fn from(w: WireBlock) -> Self {
        Block::from_u128(((w.1 as u128) << 64) | w.0 as u128)
    }
}

#[derive(Serialize, Deserialize)]
struct WireBeaver<O> {
    output_blind: O,
    vector_blind: Vec<O>,
    blinded_vector: Vec<O>,
}

/// The normative on-the-wire document for a single-output-type key.
#[derive(Serialize, Deserialize)]
pub struct KeyDocument<O> {
    pub party: u8,
    pub root: WireBlock,
    pub correction_words: Vec<WireBlock>,
    pub correction_advice: Vec<u8>,
    pub leaves: Vec<Vec<O>>,
    pub wildcards: String,
    pub beavers: Vec<Option<WireBeaver<O>>>,
    pub offset_share: u64,
}

impl<O: Output + Serialize + DeserializeOwned> KeyDocument<O> {
    #[must_use]
    pub fn from_key(key: &Key<O>) -> Self {
        let mut wildcards = String::with_capacity(key.leaves.len() + 1);
        wildcards.push(if key.input_wildcard.is_ready() { '0' } else { '1' });
        for layer in &key.leaves {
            wildcards.push(if layer.wildcard.is_ready() { '0' } else { '1' });
        }
        Self {
            party: key.party,
            root: key.tree.root.into(),
            correction_words: key.tree.correction_words.iter().copied().map(Into::into).collect(),
            correction_advice: key.tree.correction_advice.clone(),
            leaves: key.leaves.iter().map(|l| l.leaf.0.clone()).collect(),
            wildcards,
            beavers: key
                .leaves
                .iter()
                .map(|l| {
                    l.beaver.as_ref().map(|b| WireBeaver {
                        output_blind: b.output_blind,
                        vector_blind: b.vector_blind.clone(),
                        blinded_vector: b.blinded_vector.clone(),
                    })
                })
                .collect(),
            offset_share: key.offset_share,
        }
    }

    pub fn into_key(self) -> Result<Key<O>> {
        let chars: Vec<char> = self.wildcards.chars().collect();
        if chars.len() != self.leaves.len() + 1 {
            bail!("wildcards field length does not match leaves count");
        }
        let input_is_wildcard = chars[0] == '1';
        let tree = Tree {
            root: self.root.into(),
            correction_words: self.correction_words.into_iter().map(Into::into).collect(),
            correction_advice: self.correction_advice,
        };
        let mut leaves = Vec::with_capacity(self.leaves.len());
        for (i, (leaf_vals, beaver)) in self.leaves.into_iter().zip(self.beavers).enumerate() {
            let is_wc = chars[i + 1] == '1';
            let leaf = LeafBlock(leaf_vals);
            let layer = match (is_wc, beaver) {
                (true, Some(b)) => LeafLayer::wildcard(
                    leaf,
                    Beaver { output_blind: b.output_blind, vector_blind: b.vector_blind, blinded_vector: b.blinded_vector },
                ),
                (false, _) => LeafLayer::concrete(leaf),
                (true, None) => bail!("wildcard output slot {i} missing beaver material"),
            };
            leaves.push(layer);
        }
        Ok(Key::new(self.party, tree, leaves, input_is_wildcard, self.offset_share))
    }
}

fn ext_lower(path: &Path) -> String {
    path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_ascii_lowercase()
}

pub fn write_key_json<O: Output + Serialize + DeserializeOwned>(key: &Key<O>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(f), &KeyDocument::from_key(key))?;
    Ok(())
}

pub fn read_key_json<O: Output + Serialize + DeserializeOwned>(path: impl AsRef<Path>) -> Result<Key<O>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let doc: KeyDocument<O> = serde_json::from_reader(BufReader::new(f))?;
    doc.into_key()
}

pub fn write_key_cbor<O: Output + Serialize + DeserializeOwned>(key: &Key<O>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    ciborium::into_writer(&KeyDocument::from_key(key), BufWriter::new(f)).context("encoding key as CBOR")?;
    Ok(())
}

pub fn read_key_cbor<O: Output + Serialize + DeserializeOwned>(path: impl AsRef<Path>) -> Result<Key<O>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let doc: KeyDocument<O> = ciborium::from_reader(BufReader::new(f)).context("decoding key from CBOR")?;
    doc.into_key()
}

/// Auto-detect JSON vs CBOR from the file extension.
pub fn write_key_auto<O: Output + Serialize + DeserializeOwned>(key: &Key<O>, path: impl AsRef<Path>) -> Result<()> {
    match ext_lower(path.as_ref()).as_str() {
        "json" => write_key_json(key, path),
        "cbor" => write_key_cbor(key, path),
        other => bail!("unrecognized key file extension: {other:?}"),
    }
}

pub fn read_key_auto<O: Output + Serialize + DeserializeOwned>(path: impl AsRef<Path>) -> Result<Key<O>> {
    match ext_lower(path.as_ref()).as_str() {
        "json" => read_key_json(path),
        "cbor" => read_key_cbor(path),
        other => bail!("unrecognized key file extension: {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_key() -> Key<u8> {
        let tree = Tree { root: Block::from_u128(1), correction_words: vec![Block::from_u128(2), Block::from_u128(4)], correction_advice: vec![1, 2] };
        let leaves = vec![LeafLayer::concrete(LeafBlock(vec![0u8; 16]))];
        Key::new(0, tree, leaves, false, 0)
    }

    #[test]
    fn json_roundtrip_preserves_wildcard_mask_and_tree() {
        let key = sample_key();
        let doc = KeyDocument::from_key(&key);
        let json = serde_json::to_string(&doc).unwrap();
        let doc2: KeyDocument<u8> = serde_json::from_str(&json).unwrap();
        let key2 = doc2.into_key().unwrap();
        assert_eq!(key2.common_part_hash(), key.common_part_hash());
        assert_eq!(key2.tree.correction_advice, key.tree.correction_advice);
    }

    #[test]
    fn cbor_roundtrip_matches_json_roundtrip() {
        let key = sample_key();
        let doc = KeyDocument::from_key(&key);
        let mut buf = Vec::new();
        ciborium::into_writer(&doc, &mut buf).unwrap();
        let doc2: KeyDocument<u8> = ciborium::from_reader(buf.as_slice()).unwrap();
        let key2 = doc2.into_key().unwrap();
        assert_eq!(key2.common_part_hash(), key.common_part_hash());
    }

    #[test]
    fn auto_rejects_unknown_extension() {
        let key = sample_key();
        assert!(write_key_auto(&key, "/tmp/dpf-key-test.bin").is_err());
    }
}
