//! Fixed SQL text for the analytical queries.
//!
//! Every template opens with the date range as `$1`/`$2`. Templates ending in
//! `_HEAD` stop where optional predicates are appended and continue with the
//! matching `_TAIL`.

/// Literal form of [`crate::PRODUCTION_MODEL_ID`], usable inside `concat!`.
macro_rules! production_model {
    () => {
        "1"
    };
}

pub const FEEDS_COUNT_HEAD: &str = concat!(
    "SELECT COUNT(*) \
     FROM feeds f \
     JOIN feed_sentiments fs ON fs.feed_id = f.id AND fs.model_id = ",
    production_model!(),
    " JOIN sources s ON s.id = f.source_id \
     WHERE f.feed_date BETWEEN $1 AND $2"
);

pub const FEEDS_PAGE_HEAD: &str = concat!(
    "SELECT f.id, f.title, f.link, f.source_id, f.words, f.published, f.feed_date, \
            fs.id, fs.sentiment_key, fs.sentiment_value::double precision, \
            fs.sentiment_compound::double precision, \
            s.id, s.name \
     FROM feeds f \
     JOIN feed_sentiments fs ON fs.feed_id = f.id AND fs.model_id = ",
    production_model!(),
    " JOIN sources s ON s.id = f.source_id \
     WHERE f.feed_date BETWEEN $1 AND $2"
);

pub const FEEDS_PAGE_ORDER: &str = " ORDER BY f.published DESC, f.id DESC";
pub const LIMIT: &str = " LIMIT {}";
pub const OFFSET: &str = " OFFSET {}";

pub const WORDS_BY_DATE_RANGE: &str =
    "SELECT words FROM feeds_partitioned WHERE feed_date BETWEEN $1 AND $2";

pub const SENTIMENT_BY_SOURCE_HEAD: &str = concat!(
    "SELECT f.source_id::text AS group_by, \
            COALESCE(fs.sentiment_key, 'none') AS sentiment_key, \
            COUNT(f.id) AS count \
     FROM feeds_partitioned f \
     LEFT JOIN feed_sentiments fs ON fs.feed_id = f.id AND fs.model_id = ",
    production_model!(),
    " WHERE f.feed_date BETWEEN $1 AND $2"
);

pub const SENTIMENT_BY_DATE_HEAD: &str = concat!(
    "SELECT to_char(f.feed_date, 'YYYY-MM-DD') AS group_by, \
            COALESCE(fs.sentiment_key, 'none') AS sentiment_key, \
            COUNT(f.id) AS count \
     FROM feeds_partitioned f \
     LEFT JOIN feed_sentiments fs ON fs.feed_id = f.id AND fs.model_id = ",
    production_model!(),
    " WHERE f.feed_date BETWEEN $1 AND $2"
);

pub const SENTIMENT_GROUPED_TAIL: &str =
    " GROUP BY group_by, sentiment_key ORDER BY group_by ASC";

pub const COUNT_SENTIMENTS: &str = concat!(
    "SELECT \
       COALESCE(SUM(CASE WHEN fs.sentiment_key = 'positive' THEN 1 ELSE 0 END), 0)::bigint, \
       COALESCE(SUM(CASE WHEN fs.sentiment_key = 'negative' THEN 1 ELSE 0 END), 0)::bigint, \
       COALESCE(SUM(CASE WHEN fs.sentiment_key = 'neutral' THEN 1 ELSE 0 END), 0)::bigint \
     FROM feed_sentiments fs \
     WHERE fs.model_id = ",
    production_model!(),
    " AND fs.feed_date BETWEEN $1 AND $2"
);

/// `$3` sentiment class, `$4` limit.
pub const TOP_FEEDS: &str = concat!(
    "SELECT f.title, f.published, s.name, \
            fs.sentiment_value::double precision, fs.sentiment_compound::double precision \
     FROM feed_sentiments fs \
     JOIN feeds f ON fs.feed_id = f.id \
     JOIN sources s ON f.source_id = s.id \
     WHERE fs.model_id = ",
    production_model!(),
    " AND f.feed_date BETWEEN $1 AND $2 \
      AND fs.sentiment_key = $3 \
     ORDER BY fs.sentiment_value DESC \
     LIMIT $4"
);

/// `$3` keyword list.
pub const BIAS_DETECTION_HEAD: &str = concat!(
    "WITH input_words AS (SELECT unnest($3::text[]) AS input_word) \
     SELECT s.name AS source_name, \
            iw.input_word AS keyword, \
            COUNT(*) AS mention_count, \
            COALESCE(( \
              SUM(CASE WHEN fs.sentiment_key = 'positive' THEN fs.sentiment_value ELSE 0 END) \
            - SUM(CASE WHEN fs.sentiment_key = 'negative' THEN fs.sentiment_value ELSE 0 END) \
            ) / NULLIF(COUNT(*), 0)::double precision, 0)::double precision AS net_sentiment_score, \
            COALESCE(STDDEV(fs.sentiment_value)::double precision, 0)::double precision AS sentiment_std_dev \
     FROM feeds f \
     JOIN feed_sentiments fs ON fs.feed_id = f.id AND fs.model_id = ",
    production_model!(),
    " JOIN sources s ON f.source_id = s.id \
     CROSS JOIN input_words iw \
     WHERE f.published BETWEEN $1 AND $2 \
       AND f.search_vector @@ to_tsquery('hungarian', iw.input_word || ':*')"
);

pub const BIAS_DETECTION_TAIL: &str =
    " GROUP BY s.name, iw.input_word ORDER BY iw.input_word, net_sentiment_score DESC";

pub const CORRELATION_HEAD: &str = concat!(
    "SELECT s.name AS source_name, \
            date_trunc('month', f.published)::date AS month, \
            COALESCE(AVG(fs.sentiment_compound), 0)::double precision AS avg_compound \
     FROM feeds f \
     JOIN feed_sentiments fs ON fs.feed_id = f.id AND fs.model_id = ",
    production_model!(),
    " JOIN sources s ON f.source_id = s.id \
     WHERE f.published BETWEEN $1 AND $2"
);

pub const CORRELATION_TAIL: &str = " GROUP BY s.name, month ORDER BY s.name, month";

/// `$3` target word, `$4` stopword list.
pub const CO_OCCURRENCE_HEAD: &str = concat!(
    "WITH matching AS ( \
       SELECT f.id, fs.sentiment_key, f.words \
       FROM feeds f \
       JOIN feed_sentiments fs ON fs.feed_id = f.id AND fs.model_id = ",
    production_model!(),
    " WHERE f.published BETWEEN $1 AND $2 \
         AND EXISTS (SELECT 1 FROM unnest(f.words) AS t(word) WHERE lower(t.word) = lower($3))"
);

pub const CO_OCCURRENCE_TAIL: &str = " \
     ), co_words AS ( \
       SELECT DISTINCT m.id, m.sentiment_key, lower(w.word) AS co_word \
       FROM matching m \
       CROSS JOIN LATERAL unnest(m.words) AS w(word) \
       WHERE w.word IS NOT NULL \
         AND w.word <> '' \
         AND lower(w.word) <> lower($3) \
         AND lower(w.word) <> ALL($4::text[]) \
     ) \
     SELECT co_word, \
            COUNT(*) AS co_occurrence, \
            COUNT(*) FILTER (WHERE sentiment_key = 'positive') AS positive_count, \
            COUNT(*) FILTER (WHERE sentiment_key = 'negative') AS negative_count, \
            COUNT(*) FILTER (WHERE sentiment_key = 'neutral') AS neutral_count \
     FROM co_words \
     GROUP BY co_word \
     HAVING COUNT(*) > 1 \
     ORDER BY co_occurrence DESC, co_word \
     LIMIT 30";

/// `$3` date part (`week` or `month`), `$4` stopword list.
pub const PHRASE_TRENDS_HEAD: &str = " \
     WITH bigrams AS ( \
       SELECT s.name AS source, \
              lower(a.word) || ' ' || lower(b.word) AS phrase, \
              EXTRACT(YEAR FROM f.published)::int AS year, \
              date_part($3::text, f.published)::int AS date_group \
       FROM feeds f \
       JOIN sources s ON s.id = f.source_id \
       CROSS JOIN LATERAL unnest(f.words) WITH ORDINALITY AS a(word, ord) \
       JOIN LATERAL unnest(f.words) WITH ORDINALITY AS b(word, ord) ON b.ord = a.ord + 1 \
       WHERE f.published BETWEEN $1 AND $2 \
         AND a.word IS NOT NULL AND a.word <> '' \
         AND b.word IS NOT NULL AND b.word <> '' \
         AND lower(a.word) <> ALL($4::text[]) \
         AND lower(b.word) <> ALL($4::text[])";

pub const PHRASE_TRENDS_COUNT: &str = " \
     ), counted AS ( \
       SELECT source, phrase, year, date_group, COUNT(*) AS frequency \
       FROM bigrams \
       WHERE TRUE";

pub const PHRASE_TRENDS_TAIL: &str = " \
       GROUP BY source, phrase, year, date_group \
     ), ranked AS ( \
       SELECT source, phrase, year, date_group, frequency, \
              ROW_NUMBER() OVER ( \
                PARTITION BY source, year, date_group \
                ORDER BY frequency DESC, phrase \
              ) AS ranked \
       FROM counted \
     ) \
     SELECT source, phrase, year, date_group, frequency, ranked \
     FROM ranked \
     WHERE ranked <= 10 \
     ORDER BY source, year, date_group, ranked";

/// `$1` language code.
pub const SOURCES_BY_LANGUAGE: &str =
    "SELECT id, rss, lang FROM sources WHERE lang = $1 AND rss IS NOT NULL ORDER BY id";
