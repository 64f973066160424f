use serde::{Deserialize, Deserializer, Serialize};

use handle_errors::Error;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    pub question: String,
    pub answer: String,
    pub category: CategoryId,
    pub difficulty: i32,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct QuestionId(pub i32);

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct CategoryId(pub i32);

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    #[serde(deserialize_with = "int_or_numeric_string")]
    pub category: i32,
    #[serde(deserialize_with = "int_or_numeric_string")]
    pub difficulty: i32,
}

impl NewQuestion {
    /// Trims the text fields and rejects blank text or a non-positive difficulty.
    pub fn validate(self) -> Result<NewQuestion, Error> {
        let question = self.question.trim().to_string();
        let answer = self.answer.trim().to_string();
        if question.is_empty() {
            return Err(Error::InvalidRequest("question text is empty".to_string()));
        }
        if answer.is_empty() {
            return Err(Error::InvalidRequest("answer is empty".to_string()));
        }
        if self.difficulty < 1 {
            return Err(Error::InvalidRequest(format!(
                "difficulty must be positive, got {}",
                self.difficulty
            )));
        }
        Ok(NewQuestion {
            question,
            answer,
            ..self
        })
    }

    pub fn category_id(&self) -> CategoryId {
        CategoryId(self.category)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Text(String),
}

/// Ids arrive either as JSON numbers or as numeric strings, depending on the client.
pub(crate) fn int_or_numeric_string<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(n) => i32::try_from(n).map_err(serde::de::Error::custom),
        IntOrString::Text(s) => s.trim().parse::<i32>().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn question_serializes_to_the_outward_shape() {
        let question = Question {
            id: QuestionId(4),
            question: "What is the heaviest organ in the human body?".to_string(),
            answer: "The Liver".to_string(),
            category: CategoryId(1),
            difficulty: 4,
        };
        assert_eq!(
            serde_json::to_value(&question).unwrap(),
            json!({
                "id": 4,
                "question": "What is the heaviest organ in the human body?",
                "answer": "The Liver",
                "category": 1,
                "difficulty": 4,
            })
        );
    }

    #[test]
    fn category_uses_type_as_label_key() {
        let category = Category {
            id: CategoryId(2),
            kind: "Art".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&category).unwrap(),
            json!({ "id": 2, "type": "Art" })
        );
    }

    #[test]
    fn new_question_accepts_numeric_strings() {
        let new: NewQuestion = serde_json::from_value(json!({
            "question": "Who was the 33rd president of the U.S.A?",
            "answer": "Harry S. Truman",
            "category": "4",
            "difficulty": "2",
        }))
        .unwrap();
        assert_eq!(new.category_id(), CategoryId(4));
        assert_eq!(new.difficulty, 2);
    }

    #[test]
    fn new_question_rejects_non_numeric_category() {
        let result = serde_json::from_value::<NewQuestion>(json!({
            "question": "q",
            "answer": "a",
            "category": "history",
            "difficulty": 1,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn validate_trims_and_checks_fields() {
        let new = NewQuestion {
            question: "  Whose autobiography is entitled 'I Know Why the Caged Bird Sings'? "
                .into(),
            answer: " Maya Angelou".into(),
            category: 4,
            difficulty: 2,
        };
        let valid = new.validate().unwrap();
        assert_eq!(
            valid.question,
            "Whose autobiography is entitled 'I Know Why the Caged Bird Sings'?"
        );
        assert_eq!(valid.answer, "Maya Angelou");

        let blank = NewQuestion {
            question: "   ".into(),
            answer: "a".into(),
            category: 1,
            difficulty: 1,
        };
        assert!(matches!(blank.validate(), Err(Error::InvalidRequest(_))));

        let zero = NewQuestion {
            question: "q".into(),
            answer: "a".into(),
            category: 1,
            difficulty: 0,
        };
        assert!(matches!(zero.validate(), Err(Error::InvalidRequest(_))));
    }
}
