use aniroute_core::{AiringStatus, Anime, CatalogEntry, EpisodeCounts, MediaFormat};

struct Row {
    id: &'static str,
    title: &'static str,
    alt: Option<&'static str>,
    format: MediaFormat,
    status: AiringStatus,
    rating: f32,
    year: u16,
    genres: &'static [&'static str],
    sub: u32,
    dub: u32,
}

const ROWS: &[Row] = &[
    Row { id: "frieren-18542", title: "Frieren: Beyond Journey's End", alt: Some("Sousou no Frieren"), format: MediaFormat::Tv, status: AiringStatus::Completed, rating: 9.3, year: 2023, genres: &["Adventure", "Drama", "Fantasy"], sub: 28, dub: 28 },
    Row { id: "one-piece-100", title: "One Piece", alt: None, format: MediaFormat::Tv, status: AiringStatus::Airing, rating: 8.7, year: 1999, genres: &["Action", "Adventure", "Comedy", "Fantasy"], sub: 1120, dub: 1085 },
    Row { id: "attack-on-titan-112", title: "Attack on Titan", alt: Some("Shingeki no Kyojin"), format: MediaFormat::Tv, status: AiringStatus::Completed, rating: 8.5, year: 2013, genres: &["Action", "Drama", "Mystery"], sub: 25, dub: 25 },
    Row { id: "attack-on-titan-season-2-3136", title: "Attack on Titan Season 2", alt: None, format: MediaFormat::Tv, status: AiringStatus::Completed, rating: 8.5, year: 2017, genres: &["Action", "Drama", "Mystery"], sub: 12, dub: 12 },
    Row { id: "naruto-677", title: "Naruto", alt: None, format: MediaFormat::Tv, status: AiringStatus::Completed, rating: 8.0, year: 2002, genres: &["Action", "Adventure", "Comedy"], sub: 220, dub: 220 },
    Row { id: "naruto-shippuden-355", title: "Naruto: Shippuden", alt: None, format: MediaFormat::Tv, status: AiringStatus::Completed, rating: 8.3, year: 2007, genres: &["Action", "Adventure", "Comedy"], sub: 500, dub: 500 },
    Row { id: "spy-x-family-17977", title: "Spy x Family", alt: None, format: MediaFormat::Tv, status: AiringStatus::Completed, rating: 8.4, year: 2022, genres: &["Action", "Comedy", "Slice of Life"], sub: 25, dub: 25 },
    Row { id: "your-name-10", title: "Your Name.", alt: Some("Kimi no Na wa."), format: MediaFormat::Movie, status: AiringStatus::Completed, rating: 8.8, year: 2016, genres: &["Drama", "Romance", "Supernatural"], sub: 1, dub: 1 },
    Row { id: "mob-psycho-100-209", title: "Mob Psycho 100", alt: None, format: MediaFormat::Tv, status: AiringStatus::Completed, rating: 8.5, year: 2016, genres: &["Action", "Comedy", "Supernatural"], sub: 12, dub: 12 },
    Row { id: "violet-evergarden-95", title: "Violet Evergarden", alt: None, format: MediaFormat::Tv, status: AiringStatus::Completed, rating: 8.7, year: 2018, genres: &["Drama", "Fantasy", "Slice of Life"], sub: 13, dub: 13 },
    Row { id: "chainsaw-man-17406", title: "Chainsaw Man", alt: None, format: MediaFormat::Tv, status: AiringStatus::Completed, rating: 8.5, year: 2022, genres: &["Action", "Horror", "Supernatural"], sub: 12, dub: 12 },
    Row { id: "mushishi-49", title: "Mushishi", alt: None, format: MediaFormat::Tv, status: AiringStatus::Completed, rating: 8.6, year: 2005, genres: &["Adventure", "Mystery", "Slice of Life", "Supernatural"], sub: 26, dub: 0 },
    Row { id: "dandadan-19319", title: "Dan Da Dan", alt: Some("Dandadan"), format: MediaFormat::Tv, status: AiringStatus::Airing, rating: 8.6, year: 2024, genres: &["Action", "Comedy", "Supernatural"], sub: 12, dub: 12 },
    Row { id: "the-apothecary-diaries-18578", title: "The Apothecary Diaries", alt: Some("Kusuriya no Hitorigoto"), format: MediaFormat::Tv, status: AiringStatus::Airing, rating: 8.8, year: 2023, genres: &["Drama", "Mystery"], sub: 24, dub: 24 },
    Row { id: "perfect-blue-437", title: "Perfect Blue", alt: None, format: MediaFormat::Movie, status: AiringStatus::Completed, rating: 8.4, year: 1997, genres: &["Drama", "Horror", "Psychological"], sub: 1, dub: 1 },
    Row { id: "kaiju-no-8-19052", title: "Kaiju No. 8", alt: None, format: MediaFormat::Tv, status: AiringStatus::Upcoming, rating: 7.9, year: 2024, genres: &["Action", "Sci-Fi"], sub: 0, dub: 0 },
];

/// Every fixture title, attributed to `source`, in trending order.
pub fn all(source: &str) -> Vec<Anime> {
    ROWS.iter()
        .map(|r| Anime {
            id: r.id.to_string(),
            title: r.title.to_string(),
            alt_title: r.alt.map(str::to_string),
            poster: Some(format!("https://img.example.invalid/{}.jpg", r.id)),
            description: None,
            format: r.format,
            status: r.status,
            rating: Some(r.rating),
            year: Some(r.year),
            genres: r.genres.iter().map(|g| (*g).to_string()).collect(),
            episodes: EpisodeCounts { sub: r.sub, dub: r.dub },
            source: source.to_string(),
        })
        .collect()
}

/// Catalog-side view of the fixtures: decorated titles, 0–100 scores.
pub fn catalog_entries() -> Vec<CatalogEntry> {
    ROWS.iter()
        .enumerate()
        .map(|(i, r)| CatalogEntry {
            catalog_id: format!("cat-{}", 1000 + i),
            title: format!("{} ({})", r.title, r.year),
            alt_titles: r.alt.map(|a| vec![a.to_string()]).unwrap_or_default(),
            genres: r.genres.iter().map(|g| (*g).to_string()).collect(),
            year: Some(r.year),
            score: Some(score_100(r.rating)),
            cover: None,
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn score_100(rating: f32) -> u8 {
    (rating * 10.0).round().clamp(0.0, 100.0) as u8
}
