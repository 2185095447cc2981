use std::collections::{BTreeMap, BTreeSet};

use crate::core::model::{ImageId, PlayerRecord, RecordStatus, ValidatedCandidate};

pub trait Reconciler {
    fn reconcile(&self, candidates: &[ValidatedCandidate]) -> Vec<PlayerRecord>;
}

/// Groups candidates by exact canonical name and keeps the highest power of
/// the best verdict tier present in each group. Every image of that tier is
/// credited; lower tiers contribute nothing.
#[derive(Debug, Default)]
pub struct MaxPowerReconciler;

impl MaxPowerReconciler {
    pub fn new() -> Self {
        Self
    }
}

impl Reconciler for MaxPowerReconciler {
    fn reconcile(&self, candidates: &[ValidatedCandidate]) -> Vec<PlayerRecord> {
        reconcile(candidates)
    }
}

pub fn reconcile(candidates: &[ValidatedCandidate]) -> Vec<PlayerRecord> {
    let mut groups: BTreeMap<&str, Vec<&ValidatedCandidate>> = BTreeMap::new();
    for validated in candidates {
        groups
            .entry(validated.candidate.key.as_str())
            .or_default()
            .push(validated);
    }

    groups
        .into_iter()
        .filter_map(|(key, members)| fold_group(key, &members))
        .collect()
}

fn fold_group(key: &str, members: &[&ValidatedCandidate]) -> Option<PlayerRecord> {
    let tier = members.iter().map(|m| m.verdict.tier()).min()?;
    let tiered: Vec<&ValidatedCandidate> = members
        .iter()
        .copied()
        .filter(|m| m.verdict.tier() == tier)
        .collect();
    let power = tiered
        .iter()
        .map(|m| m.candidate.power.unwrap_or(0))
        .max()?;
    // every image of the winning tier counts as evidence
    let images: BTreeSet<ImageId> = tiered
        .iter()
        .map(|m| m.candidate.source_image.clone())
        .collect();
    let top: Vec<&ValidatedCandidate> = tiered
        .into_iter()
        .filter(|m| m.candidate.power.unwrap_or(0) == power)
        .collect();

    // earliest image wins the display name
    let lead = top.iter().min_by(|a, b| {
        let a_pos = (&a.candidate.source_image, a.candidate.line_index, &a.candidate.name, a.verdict);
        let b_pos = (&b.candidate.source_image, b.candidate.line_index, &b.candidate.name, b.verdict);
        a_pos.cmp(&b_pos)
    })?;

    Some(PlayerRecord {
        name: lead.candidate.name.clone(),
        key: key.to_string(),
        power,
        status: if lead.verdict.is_valid() {
            RecordStatus::Valid
        } else {
            RecordStatus::Suspect
        },
        basis: lead.verdict,
        images,
    })
}
