use crate::meta::{NoduleRecord, ScanRecord};
use std::fmt;

/// Text report formatter for one patient's scan and nodules
pub struct PatientReport<'a> {
    patient_id: &'a str,
    scan: Option<&'a ScanRecord>,
    nodules: &'a [&'a NoduleRecord],
}

impl<'a> PatientReport<'a> {
    /// Creates a new patient report
    pub fn new(
        patient_id: &'a str,
        scan: Option<&'a ScanRecord>,
        nodules: &'a [&'a NoduleRecord],
    ) -> Self {
        Self {
            patient_id,
            scan,
            nodules,
        }
    }
}

impl<'a> fmt::Display for PatientReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Lung CT Patient Report")?;
        writeln!(f, "======================")?;
        writeln!(f)?;
        writeln!(f, "Patient ID:       {}", self.patient_id)?;
        writeln!(
            f,
            "Diagnosis:        {}",
            self.scan.map(|s| s.diagnosis.as_str()).unwrap_or("unknown")
        )?;
        writeln!(
            f,
            "Diagnosis Method: {}",
            self.scan
                .map(|s| s.diagnosis_method.as_str())
                .unwrap_or("unknown")
        )?;
        writeln!(f)?;

        writeln!(f, "Detected Nodules")?;
        writeln!(f, "----------------")?;

        if self.nodules.is_empty() {
            writeln!(f, "No nodules found for this patient.")?;
            return Ok(());
        }

        for nodule in self.nodules {
            writeln!(f)?;
            writeln!(f, "Nodule #{}", nodule.nodule_id)?;
            writeln!(f, "  Diameter:         {:.2} mm", nodule.diameter)?;
            writeln!(f, "  Surface Area:     {:.2} mm²", nodule.surface_area)?;
            writeln!(f, "  Volume:           {:.2} mm³", nodule.volume)?;
            writeln!(f, "  Pred. Malignancy: {}", nodule.rating().label())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_fixture() -> ScanRecord {
        ScanRecord {
            patient_id: "P1".to_string(),
            diagnosis: "Malignant".to_string(),
            diagnosis_method: "Biopsy".to_string(),
        }
    }

    fn nodule_fixture(nodule_id: u32, malignancy: i64) -> NoduleRecord {
        NoduleRecord {
            patient_id: "P1".to_string(),
            nodule_id,
            diameter: 12.34,
            surface_area: 271.2,
            volume: 321.0,
            malignancy,
        }
    }

    #[test]
    fn test_patient_report_format() {
        let scan = scan_fixture();
        let nodule = nodule_fixture(0, 5);
        let nodules: Vec<&NoduleRecord> = vec![&nodule];

        let report = PatientReport::new("P1", Some(&scan), &nodules);
        let output = format!("{}", report);

        assert!(output.contains("Lung CT Patient Report"));
        assert!(output.contains("Patient ID:       P1"));
        assert!(output.contains("Diagnosis:        Malignant"));
        assert!(output.contains("Diagnosis Method: Biopsy"));
        assert!(output.contains("Nodule #0"));
        assert!(output.contains("Diameter:         12.34 mm"));
        assert!(output.contains("Surface Area:     271.20 mm²"));
        assert!(output.contains("Volume:           321.00 mm³"));
        assert!(output.contains("Pred. Malignancy: Highly Suspicious"));
    }

    #[test]
    fn test_patient_report_without_scan_record() {
        let report = PatientReport::new("P9", None, &[]);
        let output = format!("{}", report);

        assert!(output.contains("Patient ID:       P9"));
        assert!(output.contains("Diagnosis:        unknown"));
        assert!(output.contains("No nodules found for this patient."));
    }

    #[test]
    fn test_patient_report_unknown_malignancy_score() {
        let scan = scan_fixture();
        let nodule = nodule_fixture(3, 0);
        let nodules: Vec<&NoduleRecord> = vec![&nodule];

        let report = PatientReport::new("P1", Some(&scan), &nodules);
        let output = format!("{}", report);

        assert!(output.contains("Nodule #3"));
        assert!(output.contains("Pred. Malignancy: Unknown"));
    }

    #[test]
    fn test_patient_report_lists_every_nodule() {
        let scan = scan_fixture();
        let first = nodule_fixture(0, 1);
        let second = nodule_fixture(1, 4);
        let nodules: Vec<&NoduleRecord> = vec![&first, &second];

        let report = PatientReport::new("P1", Some(&scan), &nodules);
        let output = format!("{}", report);

        assert!(output.contains("Nodule #0"));
        assert!(output.contains("Nodule #1"));
        assert!(output.contains("Pred. Malignancy: Highly Unlikely"));
        assert!(output.contains("Pred. Malignancy: Moderately Suspicious"));
    }
}
