//! Seeded survey data.
//!
//! | disease            | question                                   | answers                      |
//! |--------------------|--------------------------------------------|------------------------------|
//! | Malaria            | Are you older than 35?                     | Yes ×5, No ×3                |
//! | Malaria            | Are you male or female?                    | Male ×4, Female ×4           |
//! | Malaria            | What is your favourite colour?             | Red ×2                       |
//! | Cholera            | Is it currently the rainy season?          | Yes ×2, No ×1                |
//! | Heat Stress        | Do you think weather conditions are affecting your health? | none         |
//! | Dengue (inactive)  | Are you older than 35?                     | Yes ×1                       |

use std::sync::Arc;

use epidash_analytics::RawResponseRow;
use epidash_db::{Database, ReferenceRepository, ResponseRepository};

pub fn row(disease: &str, question: &str, choice: &str, count: i64) -> RawResponseRow {
    RawResponseRow::new(disease, question, choice, count)
}

pub struct SurveyFixture {
    pub db: Arc<Database>,
    pub malaria_id: i64,
    pub cholera_id: i64,
    pub heat_stress_id: i64,
    pub dengue_id: i64,
    pub age_question_id: i64,
}

impl SurveyFixture {
    /// Responses across every disease, including the inactive one.
    pub const TOTAL_RESPONSES: i64 = 22;
    pub const RESPONDERS: i64 = 12;
    pub const ACTIVE_DISEASES: [&'static str; 3] = ["Cholera", "Heat Stress", "Malaria"];

    /// Fresh in-memory database with the schema and the rows above.
    pub async fn seed() -> Self {
        let db = Arc::new(Database::in_memory().await.expect("in-memory database"));
        db.initialize().await.expect("schema");
        Self::seed_into(db).await
    }

    pub async fn seed_into(db: Arc<Database>) -> Self {
        let refs = ReferenceRepository::new(db.clone());
        let responses = ResponseRepository::new(db.clone());

        let malaria_id = refs.insert_disease("Malaria", Some("Mosquito-borne")).await.unwrap();
        let cholera_id = refs.insert_disease("Cholera", Some("Waterborne")).await.unwrap();
        let heat_stress_id = refs.insert_disease("Heat Stress", None).await.unwrap();
        let dengue_id = refs.insert_disease("Dengue", None).await.unwrap();
        refs.set_disease_active(dengue_id, false).await.unwrap();

        let yes_no = ["Yes", "No"];

        let (age_q, age) = question(&refs, malaria_id, "Are you older than 35?", 1, &yes_no).await;
        let (gender_q, gender) =
            question(&refs, malaria_id, "Are you male or female?", 2, &["Male", "Female"]).await;
        let (colour_q, colour) =
            question(&refs, malaria_id, "What is your favourite colour?", 3, &["Red", "Blue"]).await;
        let (season_q, season) =
            question(&refs, cholera_id, "Is it currently the rainy season?", 1, &yes_no).await;
        question(
            &refs,
            heat_stress_id,
            "Do you think weather conditions are affecting your health?",
            1,
            &yes_no,
        )
        .await;
        let (dengue_q, dengue) = question(&refs, dengue_id, "Are you older than 35?", 1, &yes_no).await;

        for i in 1..=8 {
            let who = format!("r{i}");
            let age_choice = if i <= 5 { age[0] } else { age[1] };
            let gender_choice = if i <= 4 { gender[0] } else { gender[1] };
            responses.insert(&who, malaria_id, age_q, age_choice).await.unwrap();
            responses.insert(&who, malaria_id, gender_q, gender_choice).await.unwrap();
            if i <= 2 {
                responses.insert(&who, malaria_id, colour_q, colour[0]).await.unwrap();
            }
        }
        for i in 1..=3 {
            let choice = if i <= 2 { season[0] } else { season[1] };
            responses.insert(&format!("c{i}"), cholera_id, season_q, choice).await.unwrap();
        }
        responses.insert("d1", dengue_id, dengue_q, dengue[0]).await.unwrap();

        Self { db, malaria_id, cholera_id, heat_stress_id, dengue_id, age_question_id: age_q }
    }

    pub fn references(&self) -> ReferenceRepository {
        ReferenceRepository::new(self.db.clone())
    }

    pub fn responses(&self) -> ResponseRepository {
        ResponseRepository::new(self.db.clone())
    }
}

async fn question(
    refs: &ReferenceRepository,
    disease_id: i64,
    text: &str,
    order: i64,
    choices: &[&str],
) -> (i64, Vec<i64>) {
    let qid = refs.insert_question(disease_id, text, order).await.unwrap();
    let mut ids = Vec::with_capacity(choices.len());
    for (i, choice) in choices.iter().enumerate() {
        ids.push(refs.insert_choice(qid, choice, i as i64 + 1).await.unwrap());
    }
    (qid, ids)
}
