use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Heritable trait slots. The set is closed; every genotype carries all four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gene {
    /// How quickly a bean burns energy (higher = faster metabolism).
    MetabolismSpeed,
    /// Fraction of the configured speed range the bean can reach.
    MaxGeneticSpeed,
    /// How readily surplus energy is stored as fat.
    FatAccumulation,
    /// Fraction of `max_age_rounds` the bean can live; already curve-transformed.
    MaxGeneticAge,
}

impl Gene {
    pub const COUNT: usize = 4;

    pub const ALL: [Gene; Gene::COUNT] = [
        Gene::MetabolismSpeed,
        Gene::MaxGeneticSpeed,
        Gene::FatAccumulation,
        Gene::MaxGeneticAge,
    ];

    /// Valid value range for this gene.
    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (0.0, 1.0)
    }

    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            Gene::MetabolismSpeed => "MET",
            Gene::MaxGeneticSpeed => "SPD",
            Gene::FatAccumulation => "FAT",
            Gene::MaxGeneticAge => "AGE",
        }
    }

    fn index(self) -> usize {
        match self {
            Gene::MetabolismSpeed => 0,
            Gene::MaxGeneticSpeed => 1,
            Gene::FatAccumulation => 2,
            Gene::MaxGeneticAge => 3,
        }
    }
}

/// Rejections raised while building a [`Genotype`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenotypeError {
    #[error("missing gene: {0:?}")]
    MissingGene(Gene),

    #[error("gene {gene:?} value {value} out of range [{min}, {max}]")]
    OutOfRange {
        gene: Gene,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Immutable genetic blueprint fixed at birth.
///
/// Construction validates that every [`Gene`] is present and inside its
/// range; there is no way to mutate a genotype afterwards. Deserialization
/// goes through the same validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<Gene, f64>",
    into = "BTreeMap<Gene, f64>"
)]
pub struct Genotype {
    values: [f64; Gene::COUNT],
}

impl Genotype {
    pub fn new(genes: BTreeMap<Gene, f64>) -> Result<Self, GenotypeError> {
        let mut values = [0.0; Gene::COUNT];
        for gene in Gene::ALL {
            let value = *genes.get(&gene).ok_or(GenotypeError::MissingGene(gene))?;
            let (min, max) = gene.range();
            // NaN fails this comparison as well
            if !(min..=max).contains(&value) {
                return Err(GenotypeError::OutOfRange {
                    gene,
                    value,
                    min,
                    max,
                });
            }
            values[gene.index()] = value;
        }
        Ok(Self { values })
    }

    #[inline]
    #[must_use]
    pub fn gene(&self, gene: Gene) -> f64 {
        self.values[gene.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Gene, f64)> + '_ {
        Gene::ALL.iter().map(move |&g| (g, self.gene(g)))
    }

    /// Compact form used in log lines: `{MET:0.32, SPD:0.75, FAT:0.36, AGE:0.05}`.
    #[must_use]
    pub fn to_compact_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (gene, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{:.2}", gene.abbreviation(), value)?;
        }
        write!(f, "}}")
    }
}

impl TryFrom<BTreeMap<Gene, f64>> for Genotype {
    type Error = GenotypeError;

    fn try_from(genes: BTreeMap<Gene, f64>) -> Result<Self, Self::Error> {
        Self::new(genes)
    }
}

impl From<Genotype> for BTreeMap<Gene, f64> {
    fn from(genotype: Genotype) -> Self {
        genotype.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(value: f64) -> BTreeMap<Gene, f64> {
        Gene::ALL.iter().map(|&g| (g, value)).collect()
    }

    #[test]
    fn test_genotype_accepts_all_genes_in_range() {
        let genotype = Genotype::new(full(0.5)).unwrap();
        for gene in Gene::ALL {
            assert_eq!(genotype.gene(gene), 0.5);
        }
    }

    #[test]
    fn test_genotype_rejects_missing_gene() {
        let mut genes = full(0.5);
        genes.remove(&Gene::FatAccumulation);
        assert_eq!(
            Genotype::new(genes),
            Err(GenotypeError::MissingGene(Gene::FatAccumulation))
        );
    }

    #[test]
    fn test_genotype_rejects_out_of_range_and_nan() {
        let mut genes = full(0.5);
        genes.insert(Gene::MaxGeneticAge, 1.2);
        assert!(matches!(
            Genotype::new(genes),
            Err(GenotypeError::OutOfRange {
                gene: Gene::MaxGeneticAge,
                ..
            })
        ));

        let mut genes = full(0.5);
        genes.insert(Gene::MetabolismSpeed, f64::NAN);
        assert!(Genotype::new(genes).is_err());
    }

    #[test]
    fn test_compact_string() {
        let mut genes = full(0.0);
        genes.insert(Gene::MaxGeneticSpeed, 0.75);
        let genotype = Genotype::new(genes).unwrap();
        assert_eq!(
            genotype.to_compact_string(),
            "{MET:0.00, SPD:0.75, FAT:0.00, AGE:0.00}"
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let ok = r#"{"metabolism_speed":0.1,"max_genetic_speed":0.2,"fat_accumulation":0.3,"max_genetic_age":0.4}"#;
        let genotype: Genotype = serde_json::from_str(ok).unwrap();
        assert_eq!(genotype.gene(Gene::FatAccumulation), 0.3);

        let missing = r#"{"metabolism_speed":0.1,"max_genetic_speed":0.2,"fat_accumulation":0.3}"#;
        assert!(serde_json::from_str::<Genotype>(missing).is_err());
    }
}
