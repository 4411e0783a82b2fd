use crate::types::Malignancy;

/// One row of `scan_meta.csv`: a patient's scan-level diagnosis
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ScanRecord {
    /// Patient identifier
    #[serde(rename = "PatientID")]
    pub patient_id: String,

    /// Confirmed diagnosis text (e.g. "Malignant")
    #[serde(rename = "Diagnosis")]
    pub diagnosis: String,

    /// How the diagnosis was established
    #[serde(rename = "DiagnosisMethod")]
    pub diagnosis_method: String,
}

/// One row of `nodule_meta.csv`: geometry and predicted malignancy of a nodule
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct NoduleRecord {
    /// Patient identifier
    #[serde(rename = "PatientID")]
    pub patient_id: String,

    /// Nodule identifier, unique within a patient
    #[serde(rename = "NoduleID")]
    pub nodule_id: u32,

    /// Equivalent diameter in mm
    #[serde(rename = "Diameter")]
    pub diameter: f64,

    /// Surface area in mm²
    #[serde(rename = "SurfaceArea")]
    pub surface_area: f64,

    /// Volume in mm³
    #[serde(rename = "Volume")]
    pub volume: f64,

    /// Raw 1-5 malignancy score as annotated
    #[serde(rename = "Malignancy")]
    pub malignancy: i64,
}

impl NoduleRecord {
    /// Returns the malignancy rating for this nodule
    ///
    /// Out-of-domain scores yield [`Malignancy::Unknown`].
    pub fn rating(&self) -> Malignancy {
        Malignancy::from_score(self.malignancy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_record_from_csv() {
        let data = "PatientID,Diagnosis,DiagnosisMethod\nP1,Malignant,Biopsy\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let record: ScanRecord = reader.deserialize().next().unwrap().unwrap();

        assert_eq!(record.patient_id, "P1");
        assert_eq!(record.diagnosis, "Malignant");
        assert_eq!(record.diagnosis_method, "Biopsy");
    }

    #[test]
    fn test_nodule_record_from_csv() {
        let data = "PatientID,NoduleID,Diameter,SurfaceArea,Volume,Malignancy\n\
                    P1,1,12.34,56.78,90.12,4\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let record: NoduleRecord = reader.deserialize().next().unwrap().unwrap();

        assert_eq!(record.patient_id, "P1");
        assert_eq!(record.nodule_id, 1);
        assert_eq!(record.diameter, 12.34);
        assert_eq!(record.surface_area, 56.78);
        assert_eq!(record.volume, 90.12);
        assert_eq!(record.rating(), Malignancy::ModeratelySuspicious);
    }

    #[test]
    fn test_nodule_record_unknown_malignancy() {
        let record = NoduleRecord {
            patient_id: "P1".to_string(),
            nodule_id: 2,
            diameter: 3.0,
            surface_area: 20.0,
            volume: 10.0,
            malignancy: 99,
        };
        assert_eq!(record.rating(), Malignancy::Unknown);
        assert_eq!(record.rating().label(), "Unknown");
    }
}
