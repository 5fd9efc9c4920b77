//! Transaction structure and binary format
//!
//! Inputs either mint coins (the single base input of a coinbase) or spend
//! earlier outputs through a key image; outputs pay one-time keys.

use serde::{Deserialize, Serialize};

use crate::crypto::{fast_hash, Hash, PublicKey, Signature};
use crate::serialization::{write_varint, BinaryReader, SerializationError};

const INPUT_TAG_BASE: u8 = 0xFF;
const INPUT_TAG_KEY: u8 = 0x02;
const OUTPUT_TAG_KEY: u8 = 0x02;

/// A transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionInput {
    /// Coinbase input minting the reward of block `block_index`
    Base { block_index: u32 },
    /// Spend of a ring of earlier outputs of the same amount
    Key {
        amount: u64,
        /// Relative global output indexes of the ring members
        output_indexes: Vec<u32>,
        key_image: PublicKey,
    },
}

impl TransactionInput {
    /// Amount carried by the input; base inputs carry none
    pub fn amount(&self) -> u64 {
        match self {
            TransactionInput::Base { .. } => 0,
            TransactionInput::Key { amount, .. } => *amount,
        }
    }

    fn signature_count(&self) -> usize {
        match self {
            TransactionInput::Base { .. } => 0,
            TransactionInput::Key { output_indexes, .. } => output_indexes.len(),
        }
    }
}

/// A transaction output paying a one-time key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub amount: u64,
    pub key: PublicKey,
}

/// A complete transaction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u8,
    /// Block height (or timestamp) before which outputs cannot be spent
    pub unlock_time: u64,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    /// Tagged auxiliary data, see [`crate::validation::extra`]
    pub extra: Vec<u8>,
    /// One signature list per input, empty for unsigned transactions
    pub signatures: Vec<Vec<Signature>>,
}

impl Transaction {
    /// Check if this is a coinbase transaction
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && matches!(self.inputs[0], TransactionInput::Base { .. })
    }

    pub fn input_amounts(&self) -> Vec<u64> {
        self.inputs.iter().map(TransactionInput::amount).collect()
    }

    pub fn output_amounts(&self) -> Vec<u64> {
        self.outputs.iter().map(|o| o.amount).collect()
    }

    /// Sum of output amounts, `None` on overflow
    pub fn total_output_value(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.amount))
    }

    /// Serialize the prefix (everything but signatures)
    pub fn prefix_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.write_prefix(&mut bytes);
        bytes
    }

    /// Serialize the full transaction
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.write_prefix(&mut bytes);
        for signature in self.signatures.iter().flatten() {
            bytes.extend_from_slice(&signature.0);
        }
        bytes
    }

    /// Size of the full binary serialization
    pub fn binary_size(&self) -> u64 {
        self.to_bytes().len() as u64
    }

    /// Transaction identifier
    pub fn hash(&self) -> Hash {
        fast_hash(&self.to_bytes())
    }

    pub fn prefix_hash(&self) -> Hash {
        fast_hash(&self.prefix_bytes())
    }

    fn write_prefix(&self, bytes: &mut Vec<u8>) {
        write_varint(bytes, self.version as u64);
        write_varint(bytes, self.unlock_time);

        write_varint(bytes, self.inputs.len() as u64);
        for input in &self.inputs {
            match input {
                TransactionInput::Base { block_index } => {
                    bytes.push(INPUT_TAG_BASE);
                    write_varint(bytes, *block_index as u64);
                }
                TransactionInput::Key {
                    amount,
                    output_indexes,
                    key_image,
                } => {
                    bytes.push(INPUT_TAG_KEY);
                    write_varint(bytes, *amount);
                    write_varint(bytes, output_indexes.len() as u64);
                    for index in output_indexes {
                        write_varint(bytes, *index as u64);
                    }
                    bytes.extend_from_slice(&key_image.0);
                }
            }
        }

        write_varint(bytes, self.outputs.len() as u64);
        for output in &self.outputs {
            write_varint(bytes, output.amount);
            bytes.push(OUTPUT_TAG_KEY);
            bytes.extend_from_slice(&output.key.0);
        }

        write_varint(bytes, self.extra.len() as u64);
        bytes.extend_from_slice(&self.extra);
    }

    /// Parse a full transaction; every byte must be consumed
    pub fn from_bytes(data: &[u8]) -> Result<Self, SerializationError> {
        let mut reader = BinaryReader::new(data);

        let version = reader.read_varint_as::<u8>("transaction version")?;
        let unlock_time = reader.read_varint()?;

        let input_count = reader.read_varint_as::<usize>("input count")?;
        let mut inputs = Vec::with_capacity(input_count.min(reader.remaining()));
        for _ in 0..input_count {
            let input = match reader.read_u8()? {
                INPUT_TAG_BASE => TransactionInput::Base {
                    block_index: reader.read_varint_as::<u32>("block index")?,
                },
                INPUT_TAG_KEY => {
                    let amount = reader.read_varint()?;
                    let count = reader.read_varint_as::<usize>("ring size")?;
                    let mut output_indexes = Vec::with_capacity(count.min(reader.remaining()));
                    for _ in 0..count {
                        output_indexes.push(reader.read_varint_as::<u32>("output index")?);
                    }
                    TransactionInput::Key {
                        amount,
                        output_indexes,
                        key_image: reader.read_public_key()?,
                    }
                }
                tag => return Err(SerializationError::UnknownInputTag(tag)),
            };
            inputs.push(input);
        }

        let output_count = reader.read_varint_as::<usize>("output count")?;
        let mut outputs = Vec::with_capacity(output_count.min(reader.remaining()));
        for _ in 0..output_count {
            let amount = reader.read_varint()?;
            match reader.read_u8()? {
                OUTPUT_TAG_KEY => outputs.push(TransactionOutput {
                    amount,
                    key: reader.read_public_key()?,
                }),
                tag => return Err(SerializationError::UnknownOutputTag(tag)),
            }
        }

        let extra_len = reader.read_varint_as::<usize>("extra size")?;
        let extra = reader.read_bytes(extra_len)?.to_vec();

        let mut signatures = Vec::new();
        if inputs.iter().any(|input| input.signature_count() > 0) {
            for input in &inputs {
                let mut list = Vec::with_capacity(input.signature_count());
                for _ in 0..input.signature_count() {
                    list.push(reader.read_signature()?);
                }
                signatures.push(list);
            }
        }

        reader.finish()?;

        Ok(Self {
            version,
            unlock_time,
            inputs,
            outputs,
            extra,
            signatures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GENESIS_COINBASE_TX_HEX;

    fn sample_spend() -> Transaction {
        Transaction {
            version: 1,
            unlock_time: 0,
            inputs: vec![TransactionInput::Key {
                amount: 500,
                output_indexes: vec![10, 2, 300],
                key_image: PublicKey([7u8; 32]),
            }],
            outputs: vec![
                TransactionOutput { amount: 400, key: PublicKey([1u8; 32]) },
                TransactionOutput { amount: 90, key: PublicKey([2u8; 32]) },
            ],
            extra: vec![0x01; 33],
            signatures: vec![vec![Signature([3u8; 64]); 3]],
        }
    }

    #[test]
    fn test_genesis_blob_parses() {
        let blob = hex::decode(GENESIS_COINBASE_TX_HEX).unwrap();
        let tx = Transaction::from_bytes(&blob).unwrap();

        assert_eq!(tx.version, 1);
        assert_eq!(tx.unlock_time, 10);
        assert!(tx.is_coinbase());
        assert_eq!(tx.inputs[0], TransactionInput::Base { block_index: 0 });
        assert_eq!(tx.outputs.len(), 1);
        assert_eq!(tx.outputs[0].amount, 2_980_232);
        assert_eq!(tx.extra.len(), 33);
        assert!(tx.signatures.is_empty());

        // Re-encoding reproduces the blob exactly
        assert_eq!(tx.to_bytes(), blob);
        assert_eq!(tx.binary_size(), blob.len() as u64);
    }

    #[test]
    fn test_signed_transaction_reparses() {
        let tx = sample_spend();
        let parsed = Transaction::from_bytes(&tx.to_bytes()).unwrap();
        assert_eq!(parsed, tx);
        assert!(!parsed.is_coinbase());
    }

    #[test]
    fn test_prefix_hash_excludes_signatures() {
        let tx1 = sample_spend();
        let mut tx2 = sample_spend();
        tx2.signatures = vec![vec![Signature([9u8; 64]); 3]];

        assert_eq!(tx1.prefix_hash(), tx2.prefix_hash());
        assert_ne!(tx1.hash(), tx2.hash());
    }

    #[test]
    fn test_truncated_signatures_rejected() {
        let tx = sample_spend();
        let bytes = tx.to_bytes();
        assert!(Transaction::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn test_unknown_input_tag_rejected() {
        // version 1, unlock 0, one input tagged 0x03
        let bytes = [0x01, 0x00, 0x01, 0x03];
        assert_eq!(
            Transaction::from_bytes(&bytes),
            Err(SerializationError::UnknownInputTag(0x03))
        );
    }

    #[test]
    fn test_amount_helpers() {
        let tx = sample_spend();
        assert_eq!(tx.input_amounts(), vec![500]);
        assert_eq!(tx.output_amounts(), vec![400, 90]);
        assert_eq!(tx.total_output_value(), Some(490));
    }
}
