//! Seeded VH candidate designer.
//!
//! Candidates are built from retrieved antibody templates guided by analog
//! mutations, then topped up from the germline framework pool so that a run
//! always yields the requested count whenever anything can be built. The
//! generator is seeded from the configured seed and the mutation id, so the
//! same inputs always produce the same candidates in the same order.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use resistaid_common::confidence::clamp_unit;
use resistaid_common::{Candidate, MutationCode, MutationQuery, RetrievedRecord};
use resistaid_db::AntibodyTemplate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::codon::back_translate;
use crate::error::DesignError;
use crate::templates::{
    assemble_vh, default_framework_pool, preferred_residues, Framework, CDR3_BACKGROUND,
    CDR3_EDGE, GERMLINE_CDR1, GERMLINE_CDR2,
};

// ── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignerConfig {
    /// Candidates per run (K).
    #[serde(default = "default_num_candidates")]
    pub num_candidates: usize,
    /// Analogs below this similarity do not seed candidates.
    #[serde(default = "default_similarity_floor")]
    pub similarity_floor: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_min_cdr3_len")]
    pub min_cdr3_len: usize,
    #[serde(default = "default_max_cdr3_len")]
    pub max_cdr3_len: usize,
    /// Per-position substitution rate applied to template CDR1/CDR2.
    #[serde(default = "default_light_mutation_rate")]
    pub light_mutation_rate: f64,
}

fn default_num_candidates() -> usize { 5 }
fn default_similarity_floor() -> f64 { 0.3 }
fn default_seed() -> u64 { 42 }
fn default_min_cdr3_len() -> usize { 8 }
fn default_max_cdr3_len() -> usize { 15 }
fn default_light_mutation_rate() -> f64 { 0.1 }

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            num_candidates: default_num_candidates(),
            similarity_floor: default_similarity_floor(),
            seed: default_seed(),
            min_cdr3_len: default_min_cdr3_len(),
            max_cdr3_len: default_max_cdr3_len(),
            light_mutation_rate: default_light_mutation_rate(),
        }
    }
}

// ── Designer ────────────────────────────────────────────────────────────────

/// One designer per run. `design` and `backfill` draw from the same
/// generator and share the candidate counter.
pub struct AntibodyDesigner {
    config: DesignerConfig,
    pool: Vec<Framework>,
    mutation_id: String,
    id_stem: String,
    code: Option<MutationCode>,
    preferred: &'static [u8],
    templates: Vec<(AntibodyTemplate, f64)>,
    rng: StdRng,
    issued: usize,
}

impl AntibodyDesigner {
    pub fn new(config: DesignerConfig, query: &MutationQuery) -> Self {
        let mutation_id = query.mutation_id.clone();
        let code = query.code();
        let id_stem: String = mutation_id.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        let rng = StdRng::seed_from_u64(run_seed(config.seed, &mutation_id));
        Self {
            config,
            pool: default_framework_pool(),
            preferred: preferred_residues(&mutation_id, code),
            id_stem: if id_stem.is_empty() { "UNK".to_string() } else { id_stem },
            mutation_id,
            code,
            templates: Vec::new(),
            rng,
            issued: 0,
        }
    }

    /// Replace the germline framework pool.
    pub fn with_pool(mut self, pool: Vec<Framework>) -> Self {
        self.pool = pool;
        self
    }

    pub fn mutation_id(&self) -> &str {
        &self.mutation_id
    }

    /// Produce exactly `num_candidates` candidates, or `NoTemplates` when
    /// neither templates nor the framework pool can yield one.
    pub fn design(
        &mut self,
        analogs: &[RetrievedRecord],
        templates: &[RetrievedRecord],
    ) -> Result<Vec<Candidate>, DesignError> {
        let k = self.config.num_candidates;
        if k == 0 {
            return Ok(Vec::new());
        }

        self.templates = templates
            .iter()
            .filter_map(|r| match r.payload_as::<AntibodyTemplate>() {
                Ok(t) => Some((t, r.similarity_score)),
                Err(e) => {
                    debug!(record_id = %r.record_id, error = %e, "Skipping undecodable antibody template");
                    None
                }
            })
            .collect();

        let usable: Vec<&RetrievedRecord> = analogs
            .iter()
            .filter(|a| a.similarity_score >= self.config.similarity_floor)
            .take(k)
            .collect();

        let mut out = Vec::with_capacity(k);
        for analog in usable {
            let built = if self.templates.is_empty() {
                self.de_novo_for_analog(analog)
            } else {
                let idx = self.draw_template();
                let template = self.templates[idx].0.clone();
                self.from_template(&template, Some(analog))
            };
            if let Some(c) = built {
                out.push(c);
            }
        }

        if out.len() < k {
            match self.backfill(k - out.len()) {
                Ok(extra) => out.extend(extra),
                Err(e) if out.is_empty() => return Err(e),
                Err(_) => {}
            }
        }

        debug!(
            mutation = %self.mutation_id,
            candidates = out.len(),
            templates = self.templates.len(),
            "Designed antibody candidates"
        );
        if out.is_empty() {
            return Err(DesignError::NoTemplates);
        }
        Ok(out)
    }

    /// `n` further candidates from the framework pool, or from the retrieved
    /// templates when the pool is empty.
    pub fn backfill(&mut self, n: usize) -> Result<Vec<Candidate>, DesignError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        if !self.pool.is_empty() {
            return Ok((0..n)
                .map(|_| {
                    let fw = self.pool[self.rng.gen_range(0..self.pool.len())].clone();
                    self.from_pool(&fw)
                })
                .collect());
        }
        if self.templates.is_empty() {
            return Err(DesignError::NoTemplates);
        }
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let template = self.templates[i % self.templates.len()].0.clone();
            if let Some(c) = self.from_template(&template, None) {
                out.push(c);
            }
        }
        if out.is_empty() {
            return Err(DesignError::NoTemplates);
        }
        Ok(out)
    }

    // ── Candidate sources ──────────────────────────────────────────────────

    /// Rank-weighted draw: the i-th of T templates has weight T - i.
    fn draw_template(&mut self) -> usize {
        let t = self.templates.len();
        let weights: Vec<usize> = (0..t).map(|i| t - i).collect();
        match WeightedIndex::new(&weights) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => 0,
        }
    }

    fn from_template(
        &mut self,
        template: &AntibodyTemplate,
        analog: Option<&RetrievedRecord>,
    ) -> Option<Candidate> {
        let framework = self.resolve_framework(template)?;
        let similarity = analog.map(|a| a.similarity_score).unwrap_or(0.0);

        let cdr1 = match template.cdr1.as_deref() {
            Some(c) if !c.trim().is_empty() => self.light_mutate(c),
            _ => framework.cdr1.clone(),
        };
        let cdr2 = match template.cdr2.as_deref() {
            Some(c) if !c.trim().is_empty() => self.light_mutate(c),
            _ => framework.cdr2.clone(),
        };
        let cdr3 = self.mutate_cdr3(template.cdr3.trim(), similarity);

        let origin = template.source.as_deref().unwrap_or(&template.antibody_id);
        let source = match analog {
            Some(a) => format!(
                "{} ({}) guided by analog {} (similarity {:.2})",
                template.name,
                origin,
                analog_label(a),
                a.similarity_score
            ),
            None => format!("{} ({}) template variant", template.name, origin),
        };
        Some(self.assemble(&framework, cdr1, cdr2, cdr3, source))
    }

    fn de_novo_for_analog(&mut self, analog: &RetrievedRecord) -> Option<Candidate> {
        if self.pool.is_empty() {
            return None;
        }
        let fw = self.pool[self.rng.gen_range(0..self.pool.len())].clone();
        let base = self.generate_cdr3();
        let cdr3 = self.mutate_cdr3(&base, analog.similarity_score);
        let source = format!(
            "germline {} with de novo CDR3 guided by analog {}",
            fw.name,
            analog_label(analog)
        );
        Some(self.assemble(&fw, fw.cdr1.clone(), fw.cdr2.clone(), cdr3, source))
    }

    fn from_pool(&mut self, fw: &Framework) -> Candidate {
        let cdr3 = self.generate_cdr3();
        let source = format!("germline {} with de novo CDR3", fw.name);
        self.assemble(fw, fw.cdr1.clone(), fw.cdr2.clone(), cdr3, source)
    }

    /// Explicit FR1 sequence, then a pool entry by name, then the first 25
    /// residues of the template's full sequence, then a random pool entry.
    fn resolve_framework(&mut self, template: &AntibodyTemplate) -> Option<Framework> {
        let named = template.framework.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let from_pool = named.and_then(|n| self.pool.iter().find(|f| f.name.eq_ignore_ascii_case(n)).cloned());
        let (cdr1, cdr2) = from_pool
            .as_ref()
            .map(|f| (f.cdr1.clone(), f.cdr2.clone()))
            .unwrap_or_else(|| (GERMLINE_CDR1.to_string(), GERMLINE_CDR2.to_string()));

        if let Some(fr1) = template.framework_sequence.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let name = named.map(str::to_string).unwrap_or_else(|| format!("{} FR1", template.name));
            return Some(Framework { name, fr1: fr1.to_ascii_uppercase(), cdr1, cdr2 });
        }
        if let Some(fw) = from_pool {
            return Some(fw);
        }
        if let Some(seq) = template.sequence.as_deref().map(str::trim) {
            if seq.len() >= 25 && seq.is_ascii() {
                let name = named.map(str::to_string).unwrap_or_else(|| format!("{} FR1", template.name));
                return Some(Framework { name, fr1: seq[..25].to_ascii_uppercase(), cdr1, cdr2 });
            }
        }
        if self.pool.is_empty() {
            return None;
        }
        Some(self.pool[self.rng.gen_range(0..self.pool.len())].clone())
    }

    // ── Sequence operations ────────────────────────────────────────────────

    /// Point substitutions in the CDR3 core. The start offset tracks the
    /// mutated position; dissimilar analogs mutate more positions.
    fn mutate_cdr3(&mut self, cdr3: &str, similarity: f64) -> String {
        let mut residues: Vec<u8> = cdr3.to_ascii_uppercase().into_bytes();
        let (start, end) = if residues.len() > 4 { (2, residues.len() - 2) } else { (0, residues.len()) };
        let core = end - start;
        if core > 0 {
            let rate = 0.25 + 0.25 * (1.0 - clamp_unit(similarity));
            let count = ((core as f64 * rate).round() as usize).clamp(1, core);
            let anchor = match self.code {
                Some(c) => c.position as usize,
                None => self.mutation_id.bytes().map(usize::from).sum(),
            };
            let offset = anchor % core;
            let mut touched = Vec::with_capacity(count);
            for j in 0..count {
                let p = start + (offset + 2 * j) % core;
                if touched.contains(&p) {
                    continue;
                }
                touched.push(p);
                residues[p] = self.pick_preferred(residues[p]);
            }
        }
        fix_patterns(&mut residues);
        String::from_utf8_lossy(&residues).into_owned()
    }

    fn light_mutate(&mut self, cdr: &str) -> String {
        let rate = clamp_unit(self.config.light_mutation_rate);
        let mut residues: Vec<u8> = cdr.trim().to_ascii_uppercase().into_bytes();
        for i in 0..residues.len() {
            if self.rng.gen_bool(rate) {
                residues[i] = self.pick_preferred(residues[i]);
            }
        }
        fix_patterns(&mut residues);
        String::from_utf8_lossy(&residues).into_owned()
    }

    /// De novo CDR3: small residues at both edges, a preferred-residue
    /// biased middle.
    fn generate_cdr3(&mut self) -> String {
        let lo = self.config.min_cdr3_len.max(1);
        let hi = self.config.max_cdr3_len.max(lo);
        let len = self.rng.gen_range(lo..=hi);
        let mut residues = Vec::with_capacity(len);
        for i in 0..len {
            let r = if i < 2 || i + 2 >= len {
                CDR3_EDGE[self.rng.gen_range(0..CDR3_EDGE.len())]
            } else if self.rng.gen_bool(0.8) {
                self.preferred[self.rng.gen_range(0..self.preferred.len())]
            } else {
                CDR3_BACKGROUND[self.rng.gen_range(0..CDR3_BACKGROUND.len())]
            };
            residues.push(r);
        }
        fix_patterns(&mut residues);
        String::from_utf8_lossy(&residues).into_owned()
    }

    /// A preferred residue that differs from `current`.
    fn pick_preferred(&mut self, current: u8) -> u8 {
        let i = self.rng.gen_range(0..self.preferred.len());
        let r = self.preferred[i];
        if r == current {
            self.preferred[(i + 1) % self.preferred.len()]
        } else {
            r
        }
    }

    fn assemble(
        &mut self,
        framework: &Framework,
        cdr1: String,
        cdr2: String,
        cdr3: String,
        source: String,
    ) -> Candidate {
        self.issued += 1;
        let sequence = assemble_vh(&framework.fr1, &cdr1, &cdr2, &cdr3);
        let candidate_id = format!("DES-{}-{:03}-{}", self.id_stem, self.issued, short_digest(&sequence));
        Candidate {
            candidate_id,
            cdr3,
            framework: framework.name.clone(),
            length: sequence.chars().count(),
            biological_source: Some(source),
            genetic_code: Some(back_translate(&sequence)),
            sequence,
        }
    }
}

/// Break homopolymer triples, N-X-S/T sequons (X not P) and NG sites.
pub fn fix_patterns(cdr: &mut [u8]) {
    for i in 2..cdr.len() {
        if cdr[i] == cdr[i - 1] && cdr[i - 1] == cdr[i - 2] {
            cdr[i] = b"GSTAQ".iter().copied().find(|&c| c != cdr[i]).unwrap_or(b'G');
        }
    }
    for i in 0..cdr.len().saturating_sub(2) {
        if cdr[i] == b'N' && cdr[i + 1] != b'P' && matches!(cdr[i + 2], b'S' | b'T') {
            cdr[i] = b'Q';
        }
    }
    for i in 0..cdr.len().saturating_sub(1) {
        if cdr[i] == b'N' && cdr[i + 1] == b'G' {
            cdr[i] = b'Q';
        }
    }
}

fn analog_label(record: &RetrievedRecord) -> &str {
    record.payload_str("mutation_id").unwrap_or(&record.record_id)
}

fn run_seed(seed: u64, mutation_id: &str) -> u64 {
    let digest = Sha256::digest(mutation_id.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    seed ^ u64::from_le_bytes(bytes)
}

fn short_digest(sequence: &str) -> String {
    Sha256::digest(sequence.as_bytes())[..4]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
