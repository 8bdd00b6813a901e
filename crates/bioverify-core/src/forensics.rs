//! Shared fetch, search and verdict stages.
//!
//! Both workflows judge the same evidence: the abstract behind a manifest,
//! literal web-search hits for it, and a structured model verdict.

use tracing::debug;

use crate::domain::{Assessment, EvidenceSource, Manifest};
use crate::error::{AdapterError, Result};
use crate::ports::{ContentStore, EvidenceSearch, SearchDepth, SearchQuery, StructuredVerdict, VerdictRequest};

/// Characters of the abstract used as the literal search query.
pub const QUERY_PREFIX_CHARS: usize = 200;
/// Maximum number of search results requested.
pub const MAX_SEARCH_RESULTS: u8 = 5;

/// System instructions for the research-integrity verdict.
pub const AUDITOR_INSTRUCTIONS: &str = "\
You are a Research Integrity Auditor for the BioVerify Protocol.
Your goal is to protect the protocol from \"Stolen Stake\" attacks where users submit existing work as their own.

EVALUATION RULES:
1. EXAMINE THE DATA: You will receive an abstract and a list of web sources.
2. VERBATIM CHECK: If the search results contain a URL with the exact same title or abstract text, it is an automatic \"fail\".
3. LINGUISTIC ANALYSIS: If the sources are empty, analyze the writing. Does it read like a review (summarizing established facts) or a new discovery (presenting specific data or methodology)?
4. INTERNAL KNOWLEDGE: If you recognize this exact abstract from academic journals, mark it as \"fail\".

OUTPUT:
- decision: \"pass\" or \"fail\"
- reason: if \"fail\", cite the specific paper title or URL found. If \"pass\", explain why it qualifies as original research.";

/// Resolve a root CID to its manifest, then to the abstract text.
pub async fn fetch_abstract(content: &dyn ContentStore, root_cid: &str) -> Result<String> {
    let manifest = Manifest::from_slice(&content.fetch(root_cid).await?)?;
    let abstract_cid = manifest.abstract_cid()?;
    debug!(root_cid, abstract_cid, "resolved manifest");

    let bytes = content.fetch(abstract_cid).await?;
    String::from_utf8(bytes).map_err(|e| {
        AdapterError::Decode {
            target: format!("abstract {abstract_cid}"),
            message: e.to_string(),
        }
        .into()
    })
}

/// The literal-match query for an abstract, or `None` when it is blank.
pub fn search_query(abstract_text: &str) -> Option<SearchQuery> {
    let trimmed = abstract_text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let prefix: String = trimmed.chars().take(QUERY_PREFIX_CHARS).collect();
    Some(SearchQuery {
        query: format!("\"{prefix}\""),
        depth: SearchDepth::Advanced,
        max_results: MAX_SEARCH_RESULTS,
    })
}

/// Search for prior publications of the abstract. A blank abstract yields
/// no evidence without calling the search service.
pub async fn gather_evidence(search: &dyn EvidenceSearch, abstract_text: &str) -> Result<Vec<EvidenceSource>> {
    match search_query(abstract_text) {
        Some(query) => Ok(search.search(&query).await?),
        None => Ok(Vec::new()),
    }
}

/// Ask the verdict model for a pass/fail decision and validate its output.
pub async fn assess(
    verdict: &dyn StructuredVerdict,
    abstract_text: &str,
    evidence: &[EvidenceSource],
) -> Result<Assessment> {
    let request = VerdictRequest {
        system_instructions: AUDITOR_INSTRUCTIONS.to_string(),
        abstract_text: abstract_text.to_string(),
        evidence_json: serde_json::to_string(evidence)?,
    };
    let raw = verdict.judge(&request).await?;
    Ok(Assessment::from_model_output(&raw)?)
}
