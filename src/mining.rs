use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::transform::IncidenceMatrix;

/// A frequent itemset together with its support
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequentItemset {
    /// Item descriptions, in matrix column order
    pub items: Vec<String>,

    /// Fraction of transactions containing every item in the set
    pub support: f64,
}

/// An association rule with its scoring metrics
///
/// Leverage and conviction are computed alongside the displayed metrics but
/// the presentation layer drops them, matching the product's current tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRule {
    pub antecedent: Vec<String>,
    pub consequent: Vec<String>,
    pub antecedent_support: f64,
    pub consequent_support: f64,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub leverage: f64,
    /// None when confidence is 1 (conviction diverges)
    pub conviction: Option<f64>,
}

/// Run the full mining pass over an incidence matrix
///
/// Pure function of its inputs: extracts frequent itemsets level-wise
/// (apriori) with support >= `min_support`, then derives association rules
/// with confidence >= `min_confidence`. A threshold of 0 means no filtering
/// beyond positive support. An empty itemset list yields an empty rule list.
///
/// # Arguments
/// * `matrix` - Binary invoice-by-item matrix
/// * `min_support` - Minimum support for itemsets, in [0, 1]
/// * `min_confidence` - Minimum confidence for rules, in [0, 1]
///
/// # Returns
/// * `(Vec<FrequentItemset>, Vec<AssociationRule>)` - Itemsets and rules
pub fn mine(
    matrix: &IncidenceMatrix,
    min_support: f64,
    min_confidence: f64,
) -> (Vec<FrequentItemset>, Vec<AssociationRule>) {
    let frequent = frequent_itemsets(matrix, min_support);
    let rules = association_rules(matrix, &frequent, min_confidence);

    let itemsets = frequent
        .iter()
        .map(|(items, support)| FrequentItemset {
            items: items.iter().map(|&i| matrix.items[i].clone()).collect(),
            support: *support,
        })
        .collect();

    (itemsets, rules)
}

/// Level-wise apriori over item column indices
///
/// Returns sorted index vectors with their support, smallest itemsets first.
/// Candidates are generated by joining (k-1)-itemsets sharing a common prefix
/// and pruned by downward closure before their support is counted.
fn frequent_itemsets(matrix: &IncidenceMatrix, min_support: f64) -> Vec<(Vec<usize>, f64)> {
    let n = matrix.transaction_count();
    if n == 0 {
        return Vec::new();
    }

    let mut all: Vec<(Vec<usize>, f64)> = Vec::new();

    // L1: single items
    let mut current: Vec<Vec<usize>> = Vec::new();
    for item in 0..matrix.item_count() {
        let support = support_of(matrix, &[item]);
        if support > 0.0 && support >= min_support {
            current.push(vec![item]);
            all.push((vec![item], support));
        }
    }

    // Lk from L(k-1) until no candidates survive
    while current.len() > 1 {
        let known: HashSet<&[usize]> = current.iter().map(|v| v.as_slice()).collect();
        let mut next: Vec<Vec<usize>> = Vec::new();

        for i in 0..current.len() {
            for j in (i + 1)..current.len() {
                let a = &current[i];
                let b = &current[j];
                // Join step: identical prefixes, differing only in the last item
                if a[..a.len() - 1] != b[..b.len() - 1] {
                    continue;
                }
                let mut candidate = a.clone();
                candidate.push(b[b.len() - 1]);

                if !subsets_are_frequent(&candidate, &known) {
                    continue;
                }

                let support = support_of(matrix, &candidate);
                if support > 0.0 && support >= min_support {
                    all.push((candidate.clone(), support));
                    next.push(candidate);
                }
            }
        }

        current = next;
    }

    all
}

/// Derive rules from the frequent itemsets
///
/// Every non-empty proper subset of each itemset of size >= 2 becomes an
/// antecedent. Subset supports are always available in `frequent` by the
/// downward-closure property.
fn association_rules(
    matrix: &IncidenceMatrix,
    frequent: &[(Vec<usize>, f64)],
    min_confidence: f64,
) -> Vec<AssociationRule> {
    let supports: HashMap<&[usize], f64> = frequent
        .iter()
        .map(|(items, support)| (items.as_slice(), *support))
        .collect();

    let mut rules = Vec::new();

    for (items, support) in frequent {
        if items.len() < 2 {
            continue;
        }

        // Enumerate non-empty proper subsets via bitmask over the item slots
        for mask in 1..((1u32 << items.len()) - 1) {
            let mut antecedent = Vec::new();
            let mut consequent = Vec::new();
            for (slot, &item) in items.iter().enumerate() {
                if mask & (1 << slot) != 0 {
                    antecedent.push(item);
                } else {
                    consequent.push(item);
                }
            }

            let Some(&antecedent_support) = supports.get(antecedent.as_slice()) else {
                continue;
            };
            let Some(&consequent_support) = supports.get(consequent.as_slice()) else {
                continue;
            };

            let confidence = support / antecedent_support;
            if confidence < min_confidence {
                continue;
            }

            let lift = confidence / consequent_support;
            let leverage = support - antecedent_support * consequent_support;
            let conviction = if confidence < 1.0 {
                Some((1.0 - consequent_support) / (1.0 - confidence))
            } else {
                None
            };

            rules.push(AssociationRule {
                antecedent: antecedent.iter().map(|&i| matrix.items[i].clone()).collect(),
                consequent: consequent.iter().map(|&i| matrix.items[i].clone()).collect(),
                antecedent_support,
                consequent_support,
                support: *support,
                confidence,
                lift,
                leverage,
                conviction,
            });
        }
    }

    rules
}

fn support_of(matrix: &IncidenceMatrix, items: &[usize]) -> f64 {
    let hits = matrix
        .cells
        .iter()
        .filter(|row| items.iter().all(|&i| row[i] == 1))
        .count();
    hits as f64 / matrix.transaction_count() as f64
}

fn subsets_are_frequent(candidate: &[usize], known: &HashSet<&[usize]>) -> bool {
    // Every (k-1)-subset of a frequent k-itemset must itself be frequent
    let mut subset = Vec::with_capacity(candidate.len() - 1);
    for skip in 0..candidate.len() {
        subset.clear();
        subset.extend(
            candidate
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != skip)
                .map(|(_, &item)| item),
        );
        if !known.contains(subset.as_slice()) {
            return false;
        }
    }
    true
}
