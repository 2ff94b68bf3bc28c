//! Curated clinical background for the best-characterised HER2 resistance
//! mutations. Unknown mutations get no context rather than placeholder text.

use resistaid_common::mutation::normalise_mutation_id;
use resistaid_common::ClinicalContext;

struct Entry {
    mutation: &'static str,
    prevalence: &'static str,
    clinical_impact: &'static str,
    treatment_implications: &'static str,
    prognosis: &'static str,
}

const TABLE: &[Entry] = &[
    Entry {
        mutation: "L755S",
        prevalence: "5-7% of trastuzumab-resistant cases",
        clinical_impact: "Reduces drug binding affinity by 50-100x",
        treatment_implications: "Consider T-DM1 or neratinib",
        prognosis: "Worse progression-free survival",
    },
    Entry {
        mutation: "T798I",
        prevalence: "2-3% of resistant cases",
        clinical_impact: "Gatekeeper mutation, affects multiple TKIs",
        treatment_implications: "Avoid lapatinib/neratinib",
        prognosis: "Requires novel antibody approaches",
    },
    Entry {
        mutation: "D769H",
        prevalence: "3-4% of resistant cases",
        clinical_impact: "Alters activation loop dynamics",
        treatment_implications: "May respond to higher antibody doses",
        prognosis: "Variable response to second-line therapies",
    },
];

pub fn clinical_context(mutation_id: &str) -> Option<ClinicalContext> {
    let id = normalise_mutation_id(mutation_id);
    TABLE.iter().find(|e| e.mutation == id).map(|e| ClinicalContext {
        prevalence: e.prevalence.to_string(),
        clinical_impact: e.clinical_impact.to_string(),
        treatment_implications: e.treatment_implications.to_string(),
        prognosis: e.prognosis.to_string(),
    })
}
