use serde::Deserialize;

/// Payload for `POST /farmer/create`. Everything is optional except that
/// `crops` defaults to an empty list rather than null.
#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub village: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub land_acres: Option<f64>,
    pub soil_type: Option<String>,
    #[serde(default)]
    pub crops: Vec<String>,
    pub irrigation: Option<String>,
}

/// Payload for `PUT /farmer/update`. Absent fields keep their stored value.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub village: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub land_acres: Option<f64>,
    pub soil_type: Option<String>,
    pub crops: Option<Vec<String>>,
    pub irrigation: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_crops_to_empty() {
        let req: CreateProfileRequest =
            serde_json::from_str(r#"{"village":"Rampur","district":"Sitapur"}"#).unwrap();
        assert_eq!(req.village.as_deref(), Some("Rampur"));
        assert!(req.crops.is_empty());
        assert!(req.land_acres.is_none());
    }

    #[test]
    fn update_distinguishes_absent_from_empty_crops() {
        let absent: UpdateProfileRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(absent.crops.is_none());

        let cleared: UpdateProfileRequest = serde_json::from_str(r#"{"crops":[]}"#).unwrap();
        assert_eq!(cleared.crops, Some(vec![]));
    }
}
