use mongodb::bson::{doc, Bson, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Date,
}

impl FieldType {
    fn bson_type(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Date => "date",
        }
    }

    fn matches(self, value: &Bson) -> bool {
        matches!(
            (self, value),
            (FieldType::String, Bson::String(_)) | (FieldType::Date, Bson::DateTime(_))
        )
    }
}

/// Structural validator for a collection: every listed field is required and
/// must carry the given type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSchema {
    fields: Vec<(String, FieldType)>,
}

impl CollectionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push((name.into(), field_type));
        self
    }

    /// MongoDB `$jsonSchema` validator document.
    pub fn to_validator(&self) -> Document {
        let required: Vec<Bson> = self
            .fields
            .iter()
            .map(|(name, _)| Bson::String(name.clone()))
            .collect();

        let mut properties = Document::new();
        for (name, field_type) in &self.fields {
            properties.insert(name.clone(), doc! { "bsonType": field_type.bson_type() });
        }

        doc! {
            "$jsonSchema": {
                "bsonType": "object",
                "required": required,
                "properties": properties,
            }
        }
    }

    pub fn check(&self, doc: &Document) -> Result<(), String> {
        for (name, field_type) in &self.fields {
            match doc.get(name) {
                None => return Err(format!("missing required field '{}'", name)),
                Some(value) if !field_type.matches(value) => {
                    return Err(format!(
                        "field '{}' must be of type {}",
                        name,
                        field_type.bson_type()
                    ))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::DateTime;

    fn schema() -> CollectionSchema {
        CollectionSchema::new()
            .required("author", FieldType::String)
            .required("created_at", FieldType::Date)
    }

    #[test]
    fn renders_json_schema_validator() {
        let validator = schema().to_validator();
        let json_schema = validator.get_document("$jsonSchema").unwrap();

        assert_eq!(json_schema.get_str("bsonType").unwrap(), "object");
        let required: Vec<&str> = json_schema
            .get_array("required")
            .unwrap()
            .iter()
            .filter_map(Bson::as_str)
            .collect();
        assert_eq!(required, vec!["author", "created_at"]);

        let properties = json_schema.get_document("properties").unwrap();
        assert_eq!(
            properties.get_document("created_at").unwrap().get_str("bsonType").unwrap(),
            "date"
        );
    }

    #[test]
    fn accepts_conforming_document() {
        let doc = doc! { "author": "Bob", "created_at": DateTime::now(), "extra": 1 };
        assert!(schema().check(&doc).is_ok());
    }

    #[test]
    fn rejects_missing_and_mistyped_fields() {
        let missing = doc! { "author": "Bob" };
        assert!(schema().check(&missing).unwrap_err().contains("created_at"));

        let mistyped = doc! { "author": 42, "created_at": DateTime::now() };
        assert!(schema().check(&mistyped).unwrap_err().contains("author"));
    }
}
