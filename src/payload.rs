use crate::model::PersistedPoint;

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("annotations field is not a point list: {0}")]
    Annotations(#[from] serde_json::Error),
    #[error("margin field is not a number: {0:?}")]
    Margin(String),
}

/// Which submit button sent the form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SaveAction {
    #[default]
    Save,
    /// Save, then move on to the next image without human annotations.
    SaveAndContinue,
}

/// Form fields written into the outgoing save submission.
#[derive(Clone, Debug, PartialEq)]
pub struct SavePayload {
    /// JSON array of `{x, y}` objects.
    pub annotations: String,
    pub margin: String,
    pub action: SaveAction,
}

impl SavePayload {
    pub fn new(points: &[PersistedPoint], margin: u32) -> Self {
        // serde_json writes non-finite floats as null, so a point list cannot
        // fail to serialize.
        let annotations =
            serde_json::to_string(points).expect("point lists always serialize to JSON");
        Self {
            annotations,
            margin: margin.to_string(),
            action: SaveAction::Save,
        }
    }

    pub fn with_action(mut self, action: SaveAction) -> Self {
        self.action = action;
        self
    }

    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("annotations", self.annotations.clone()),
            ("margin", self.margin.clone()),
        ];
        if self.action == SaveAction::SaveAndContinue {
            fields.push(("save_and_continue", "1".to_string()));
        }
        fields
    }

    pub fn to_form_urlencoded(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in self.form_fields() {
            serializer.append_pair(name, &value);
        }
        serializer.finish()
    }

    pub fn points(&self) -> Result<Vec<PersistedPoint>, PayloadError> {
        Ok(serde_json::from_str(self.annotations.trim())?)
    }

    pub fn margin_value(&self) -> Result<u32, PayloadError> {
        self.margin
            .trim()
            .parse()
            .map_err(|_| PayloadError::Margin(self.margin.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_carry_points_and_margin() {
        let payload = SavePayload::new(&[PersistedPoint { x: 10.0, y: 20.0 }], 96);
        assert_eq!(
            payload.form_fields(),
            vec![
                ("annotations", r#"[{"x":10.0,"y":20.0}]"#.to_string()),
                ("margin", "96".to_string()),
            ]
        );
    }

    #[test]
    fn odd_coordinates_keep_every_point() {
        let payload = SavePayload::new(
            &[
                PersistedPoint { x: f32::NAN, y: 1.0 },
                PersistedPoint { x: -0.5, y: f32::MAX },
            ],
            96,
        );
        let values: Vec<serde_json::Value> = serde_json::from_str(&payload.annotations).unwrap();
        assert_eq!(values.len(), 2);
        assert!(values[0]["x"].is_null());
        assert_eq!(values[1]["x"], -0.5);
    }

    #[test]
    fn continue_adds_field_and_encodes() {
        let payload = SavePayload::new(&[], 32).with_action(SaveAction::SaveAndContinue);
        assert_eq!(
            payload.to_form_urlencoded(),
            "annotations=%5B%5D&margin=32&save_and_continue=1"
        );
    }

    #[test]
    fn decodes_back() {
        let payload = SavePayload {
            annotations: r#" [{"x":1,"y":2}] "#.to_string(),
            margin: "96\n".to_string(),
            action: SaveAction::Save,
        };
        assert_eq!(payload.points().unwrap(), vec![PersistedPoint { x: 1.0, y: 2.0 }]);
        assert_eq!(payload.margin_value().unwrap(), 96);

        let bad = SavePayload {
            margin: "wide".to_string(),
            ..payload
        };
        assert!(matches!(bad.margin_value(), Err(PayloadError::Margin(_))));
    }
}
