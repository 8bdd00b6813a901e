//! Decoding of the contract events delivered by webhooks.

use serde::Deserialize;

use crate::abi::{self, AbiError, ParamType};
use crate::domain::{Address, Network, PublicationId, PublicationRef};
use crate::error::BioVerifyError;
use crate::review::ReviewInput;

/// Emitted when a publisher submits a manuscript. No indexed fields.
pub const SUBMITTED_PUBLICATION_EVENT: &str = "BioVerify_SubmittedPublication(address,uint256,string)";

/// Emitted once reviewers are selected. `publicationId` is indexed.
pub const PICKED_REVIEWERS_EVENT: &str =
    "BioVerify_Agent_PickedReviewers(uint256,string,address[],address,uint256)";

/// One log entry as delivered in `event.data.block.logs`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawLog {
    pub data: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Extract `event.data.block.logs[0]`.
///
/// A body that is not JSON is a decode error; a well-formed body without
/// the log is `Ok(None)` and should be acknowledged without action.
pub fn first_log(body: &[u8]) -> Result<Option<RawLog>, BioVerifyError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| BioVerifyError::Decode(format!("webhook body is not JSON: {e}")))?;

    let Some(log) = value.pointer("/event/data/block/logs/0") else {
        return Ok(None);
    };
    serde_json::from_value(log.clone())
        .map(Some)
        .map_err(|e| BioVerifyError::Decode(format!("malformed log entry: {e}")))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedPublication {
    pub publisher: Address,
    pub publication: PublicationRef,
}

impl SubmittedPublication {
    pub fn decode(log: &RawLog) -> Result<Self, BioVerifyError> {
        expect_topic(log, SUBMITTED_PUBLICATION_EVENT)?;
        let data = abi::decode_hex(&log.data).map_err(decode_err)?;
        let mut tokens = abi::decode(
            &[ParamType::Address, ParamType::Uint, ParamType::String],
            &data,
        )
        .map_err(decode_err)?
        .into_iter();

        let publisher = next(&mut tokens)?.into_address().map_err(decode_err)?;
        let id = next(&mut tokens)?.as_u64().map_err(decode_err)?;
        let cid = next(&mut tokens)?.into_string().map_err(decode_err)?;
        let cid = non_empty_cid(cid)?;

        Ok(Self {
            publisher,
            publication: PublicationRef::new(PublicationId(id), cid),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedReviewers {
    pub publication: PublicationRef,
    pub reviewers: Vec<Address>,
    pub senior_reviewer: Address,
    pub min_valid_reviews_count: u64,
}

impl PickedReviewers {
    pub fn decode(log: &RawLog) -> Result<Self, BioVerifyError> {
        expect_topic(log, PICKED_REVIEWERS_EVENT)?;
        let id_topic = log
            .topics
            .get(1)
            .ok_or_else(|| BioVerifyError::Decode("missing indexed publicationId topic".into()))?;
        let id = abi::word_to_u64(&abi::decode_word(id_topic).map_err(decode_err)?).map_err(decode_err)?;

        let data = abi::decode_hex(&log.data).map_err(decode_err)?;
        let mut tokens = abi::decode(
            &[
                ParamType::String,
                ParamType::AddressArray,
                ParamType::Address,
                ParamType::Uint,
            ],
            &data,
        )
        .map_err(decode_err)?
        .into_iter();

        let cid = non_empty_cid(next(&mut tokens)?.into_string().map_err(decode_err)?)?;
        let reviewers = next(&mut tokens)?.into_addresses().map_err(decode_err)?;
        let senior_reviewer = next(&mut tokens)?.into_address().map_err(decode_err)?;
        let min_valid_reviews_count = next(&mut tokens)?.as_u64().map_err(decode_err)?;

        Ok(Self {
            publication: PublicationRef::new(PublicationId(id), cid),
            reviewers,
            senior_reviewer,
            min_valid_reviews_count,
        })
    }

    pub fn into_review_input(self, network: Network) -> ReviewInput {
        ReviewInput {
            network,
            publication: self.publication,
            reviewers: self.reviewers,
            senior_reviewer: self.senior_reviewer,
            min_valid_reviews_count: self.min_valid_reviews_count,
        }
    }
}

fn expect_topic(log: &RawLog, signature: &str) -> Result<(), BioVerifyError> {
    let topic0 = log
        .topics
        .first()
        .ok_or_else(|| BioVerifyError::Decode("log has no topics".into()))?;
    let topic0 = abi::decode_word(topic0).map_err(decode_err)?;
    if topic0 != abi::event_topic(signature) {
        return Err(BioVerifyError::Decode(format!(
            "log topic does not match {signature}"
        )));
    }
    Ok(())
}

fn next(tokens: &mut impl Iterator<Item = abi::Token>) -> Result<abi::Token, BioVerifyError> {
    tokens
        .next()
        .ok_or_else(|| BioVerifyError::Decode("event data has too few fields".into()))
}

fn non_empty_cid(cid: String) -> Result<String, BioVerifyError> {
    let cid = cid.trim().to_string();
    if cid.is_empty() {
        return Err(BioVerifyError::Decode("event carries an empty CID".into()));
    }
    Ok(cid)
}

fn decode_err(e: AbiError) -> BioVerifyError {
    BioVerifyError::Decode(e.to_string())
}
