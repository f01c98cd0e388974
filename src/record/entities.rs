//! Reference entities: labs, technicians, and plots
//!
//! These rows are maintained administratively. The data-entry path only reads
//! them, through the relational sink's foreign keys.

use super::fields::{LAB_IDS, MAX_PLOT, SEED_SAMPLE_LEN};

/// A lab, identified by a single-letter code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lab {
    pub id: char,
}

/// A lab technician
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabTech {
    pub id: i64,
    pub name: String,
}

/// A plot inside a lab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plot {
    pub lab_id: char,
    pub plot: u8,
    pub current_seed_sample: Option<String>,
}

/// A consistent set of reference rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceData {
    pub labs: Vec<Lab>,
    pub lab_techs: Vec<LabTech>,
    pub plots: Vec<Plot>,
}

impl ReferenceData {
    /// The ABQ facility: labs A through E with plots 1-20 each, and the
    /// technicians on staff.
    pub fn abq_facility() -> Self {
        let labs: Vec<Lab> = LAB_IDS.into_iter().map(|id| Lab { id }).collect();

        let lab_techs = [(4291, "J Simms"), (4319, "P Taylor"), (4478, "Q Murphy"), (5607, "L Taniff")]
            .into_iter()
            .map(|(id, name)| LabTech {
                id,
                name: name.to_string(),
            })
            .collect();

        let plots = labs
            .iter()
            .flat_map(|lab| {
                (1..=MAX_PLOT).map(move |plot| Plot {
                    lab_id: lab.id,
                    plot,
                    current_seed_sample: None,
                })
            })
            .collect();

        Self {
            labs,
            lab_techs,
            plots,
        }
    }

    /// Checks that every plot belongs to a listed lab and that codes are
    /// well-formed.
    pub fn check(&self) -> Result<(), String> {
        for plot in &self.plots {
            if !self.labs.iter().any(|lab| lab.id == plot.lab_id) {
                return Err(format!("plot {} references unknown lab {}", plot.plot, plot.lab_id));
            }
            if plot.plot == 0 || plot.plot > MAX_PLOT {
                return Err(format!("plot number {} out of range", plot.plot));
            }
            if let Some(seed) = &plot.current_seed_sample {
                if seed.chars().count() != SEED_SAMPLE_LEN {
                    return Err(format!("seed sample '{}' must be {} characters", seed, SEED_SAMPLE_LEN));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facility_layout() {
        let data = ReferenceData::abq_facility();
        assert_eq!(data.labs.len(), 5);
        assert_eq!(data.plots.len(), 100);
        assert_eq!(data.lab_techs.len(), 4);
        assert!(data.check().is_ok());
    }

    #[test]
    fn test_check_rejects_orphan_plot() {
        let mut data = ReferenceData::abq_facility();
        data.plots.push(Plot {
            lab_id: 'Z',
            plot: 1,
            current_seed_sample: None,
        });
        assert!(data.check().unwrap_err().contains("unknown lab"));
    }
}
