use axum::extract::{Query, State};
use axum::Json;

use super::params::PowParams;
use super::response::ApiError;
use super::AppState;
use crate::models::{
    BiasRow, CoOccurrenceRow, CorrelationRow, FeedPage, PhraseFrequencyRow, SentimentCounts,
    SeriesResult, TopFeedRow, WordCount,
};

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn health() -> &'static str {
    "OK"
}

/// GET /pow/feeds?start_date&end_date[&sources][&free_text][&page][&items_per_page]
pub async fn feeds(
    State(state): State<AppState>,
    Query(params): Query<PowParams>,
) -> ApiResult<FeedPage> {
    let range = params.date_range()?;
    let page = state
        .repo
        .feeds(
            &range,
            &params.sources(),
            params.free_text(),
            params.page(),
            params.items_per_page(),
            &state.cancellation(),
        )
        .await
        .map_err(|e| ApiError::from_analytics("fetch feeds", e))?;
    Ok(Json(page))
}

/// GET /pow/most_common_words?start_date&end_date[&nm_common]
pub async fn most_common_words(
    State(state): State<AppState>,
    Query(params): Query<PowParams>,
) -> ApiResult<Vec<WordCount>> {
    let range = params.date_range()?;
    let words = state
        .repo
        .most_common_words(&range, params.top_n(), &state.cancellation())
        .await
        .map_err(|e| ApiError::from_analytics("most common words", e))?;
    Ok(Json(words))
}

/// GET /pow/get_sentiment_grouped?start_date&end_date[&free_text][&group_by]
pub async fn sentiment_grouped(
    State(state): State<AppState>,
    Query(params): Query<PowParams>,
) -> ApiResult<SeriesResult> {
    let range = params.date_range()?;
    let group_by = params.group_by()?;
    let series = state
        .repo
        .sentiment_grouped(&range, params.free_text(), group_by, &state.cancellation())
        .await
        .map_err(|e| ApiError::from_analytics("fetch grouped sentiments", e))?;
    Ok(Json(series))
}

/// GET /pow/count_sentiments?start_date&end_date
pub async fn count_sentiments(
    State(state): State<AppState>,
    Query(params): Query<PowParams>,
) -> ApiResult<SentimentCounts> {
    let range = params.date_range()?;
    let counts = state
        .repo
        .count_sentiments(&range, &state.cancellation())
        .await
        .map_err(|e| ApiError::from_analytics("count sentiments", e))?;
    Ok(Json(counts))
}

/// GET /pow/top_feeds?start_date&end_date[&pos_neg][&limit]
pub async fn top_feeds(
    State(state): State<AppState>,
    Query(params): Query<PowParams>,
) -> ApiResult<Vec<TopFeedRow>> {
    let range = params.date_range()?;
    let rows = state
        .repo
        .top_feeds(
            &range,
            params.sentiment_class(),
            params.limit(),
            &state.cancellation(),
        )
        .await
        .map_err(|e| ApiError::from_analytics("fetch top feeds", e))?;
    Ok(Json(rows))
}

/// GET /pow/bias_detection?start_date&end_date&words[&sources]
pub async fn bias_detection(
    State(state): State<AppState>,
    Query(params): Query<PowParams>,
) -> ApiResult<Vec<BiasRow>> {
    let range = params.date_range()?;
    let rows = state
        .repo
        .bias_detection(
            &range,
            &params.keywords(),
            &params.sources(),
            &state.cancellation(),
        )
        .await
        .map_err(|e| ApiError::from_analytics("bias detection", e))?;
    Ok(Json(rows))
}

/// GET /pow/correlation_between_sources_avg_compound?start_date&end_date&word[&sources]
pub async fn correlation(
    State(state): State<AppState>,
    Query(params): Query<PowParams>,
) -> ApiResult<Vec<CorrelationRow>> {
    let range = params.date_range()?;
    let keyword = params.keyword()?;
    let rows = state
        .repo
        .correlation(&range, keyword, &params.sources(), &state.cancellation())
        .await
        .map_err(|e| ApiError::from_analytics("correlation", e))?;
    Ok(Json(rows))
}

/// GET /pow/word_co_occurences?start_date&end_date&word[&sources]
pub async fn word_co_occurrences(
    State(state): State<AppState>,
    Query(params): Query<PowParams>,
) -> ApiResult<Vec<CoOccurrenceRow>> {
    let range = params.date_range()?;
    let word = params.keyword()?;
    let rows = state
        .repo
        .word_co_occurrences(&range, word, &params.sources(), &state.cancellation())
        .await
        .map_err(|e| ApiError::from_analytics("word co-occurrences", e))?;
    Ok(Json(rows))
}

/// GET /pow/phrase_frequency_trends?start_date&end_date[&date_group][&sources][&names_excluded]
pub async fn phrase_frequency_trends(
    State(state): State<AppState>,
    Query(params): Query<PowParams>,
) -> ApiResult<Vec<PhraseFrequencyRow>> {
    let range = params.date_range()?;
    let date_group = params.date_group()?;
    let rows = state
        .repo
        .phrase_frequency_trends(
            &range,
            date_group,
            &params.sources(),
            params.names_excluded(),
            &state.cancellation(),
        )
        .await
        .map_err(|e| ApiError::from_analytics("phrase frequency trends", e))?;
    Ok(Json(rows))
}
