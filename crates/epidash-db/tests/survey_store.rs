//! Repository queries against the seeded in-memory survey.

use epidash_analytics::{aggregate, AggregationFilter, VariableKey};
use epidash_db::ResponseFilter;
use pretty_assertions::assert_eq;
use epidash_test_utils::SurveyFixture;
use serde_json::json;

#[tokio::test]
async fn diseases_are_active_and_sorted() {
    let fx = SurveyFixture::seed().await;
    let names: Vec<String> = fx
        .references()
        .diseases()
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.disease_name)
        .collect();
    assert_eq!(names, SurveyFixture::ACTIVE_DISEASES.to_vec());
}

#[tokio::test]
async fn find_disease_ignores_case() {
    let fx = SurveyFixture::seed().await;
    let found = fx.references().find_disease("heat STRESS").await.unwrap().unwrap();
    assert_eq!(found.disease_id, fx.heat_stress_id);
    assert!(fx.references().find_disease("ebola").await.unwrap().is_none());
}

#[tokio::test]
async fn questions_follow_survey_order() {
    let fx = SurveyFixture::seed().await;
    let malaria = fx.references().questions(Some(fx.malaria_id)).await.unwrap();
    let orders: Vec<i64> = malaria.iter().map(|q| q.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
    assert_eq!(malaria[0].id, fx.age_question_id);

    let all = fx.references().questions(None).await.unwrap();
    assert_eq!(all.len(), 6);
}

#[tokio::test]
async fn inactive_question_is_hidden() {
    let fx = SurveyFixture::seed().await;
    fx.references().set_question_active(fx.age_question_id, false).await.unwrap();
    let malaria = fx.references().questions(Some(fx.malaria_id)).await.unwrap();
    assert_eq!(malaria.len(), 2);
    assert!(fx.references().set_question_active(9999, false).await.is_err());
}

#[tokio::test]
async fn choices_for_one_question() {
    let fx = SurveyFixture::seed().await;
    let choices = fx.references().choices(Some(fx.age_question_id)).await.unwrap();
    let texts: Vec<&str> = choices.iter().map(|c| c.choice_text.as_str()).collect();
    assert_eq!(texts, vec!["Yes", "No"]);
}

#[tokio::test]
async fn counts() {
    let fx = SurveyFixture::seed().await;
    let responses = fx.responses();
    assert_eq!(responses.total_responses().await.unwrap(), SurveyFixture::TOTAL_RESPONSES);
    assert_eq!(responses.responder_count().await.unwrap(), SurveyFixture::RESPONDERS);

    let stats = fx.db.stats().await.unwrap();
    assert_eq!(stats.diseases, 4);
    assert_eq!(stats.responses, SurveyFixture::TOTAL_RESPONSES);
}

#[tokio::test]
async fn responses_filter_by_disease_and_question() {
    let fx = SurveyFixture::seed().await;
    let responses = fx.responses();

    let cholera = responses
        .responses(&ResponseFilter { diseases: vec!["Cholera".into()], ..Default::default() })
        .await
        .unwrap();
    assert_eq!(cholera.len(), 3);
    assert!(cholera.iter().all(|r| r.disease_name == "Cholera"));

    let age = responses
        .responses(&ResponseFilter { question_ids: vec![fx.age_question_id], ..Default::default() })
        .await
        .unwrap();
    assert_eq!(age.len(), 8);

    // Dengue is inactive, so its single answer never shows up.
    let all = responses.responses(&ResponseFilter::default()).await.unwrap();
    assert_eq!(all.len() as i64, SurveyFixture::TOTAL_RESPONSES - 1);
}

#[tokio::test]
async fn analytics_rows_group_and_count() {
    let fx = SurveyFixture::seed().await;
    let filter = AggregationFilter::from_names(["malaria"], ["age"]);
    let rows = fx.responses().analytics_rows(&filter).await.unwrap();

    assert_eq!(rows.len(), 2);
    // Highest count first within a question.
    assert_eq!(rows[0].choice_text.as_deref(), Some("Yes"));
    assert_eq!(rows[0].response_count, Some(5));
    assert_eq!(rows[1].response_count, Some(3));
}

#[tokio::test]
async fn analytics_rows_feed_the_aggregator() {
    let fx = SurveyFixture::seed().await;
    let filter = AggregationFilter::from_names(["malaria", "cholera", "heat stress"], Vec::<&str>::new());
    let rows = fx.responses().analytics_rows(&filter).await.unwrap();
    let report = aggregate(&rows, &filter);

    assert_eq!(
        serde_json::to_value(&report.result).unwrap(),
        json!({
            "cholera": {"season": {"Rainy Season": 2, "Dry Season": 1}},
            "heat stress": {},
            "malaria": {
                "gender": {"Male": 4, "Female": 4},
                "age": {"Above 35": 5, "Below 35": 3}
            }
        })
    );
    // The favourite-colour question matches no variable.
    assert_eq!(report.skipped.unclassified, 1);
}

#[tokio::test]
async fn analytics_rows_or_variable_patterns() {
    let fx = SurveyFixture::seed().await;
    let filter = AggregationFilter::default()
        .with_variables([VariableKey::Age, VariableKey::Season]);
    let rows = fx.responses().analytics_rows(&filter).await.unwrap();
    let questions: std::collections::BTreeSet<_> =
        rows.iter().filter_map(|r| r.question_text.clone()).collect();
    assert_eq!(
        questions.into_iter().collect::<Vec<_>>(),
        vec!["Are you older than 35?".to_string(), "Is it currently the rainy season?".to_string()]
    );
}

#[tokio::test]
async fn grouped_responses_by_disease() {
    let fx = SurveyFixture::seed().await;
    let groups = fx.responses().grouped_responses().await.unwrap();
    assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["Cholera", "Malaria"]);
    assert_eq!(groups["Malaria"].len(), 18);
    assert_eq!(groups["Cholera"][0].question, "Is it currently the rainy season?");
}
