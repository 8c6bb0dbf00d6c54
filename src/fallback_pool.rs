use rand::Rng;

use crate::category_fetch::sample_indices;
use crate::state::{Category, Clue};

type RawCategory = (&'static str, [(&'static str, &'static str); 5]);

const FALLBACK_CATEGORIES: [RawCategory; 6] = [
    (
        "Video Games",
        [
            ("What year was the original PlayStation released?", "1994"),
            ("Which game features the Triforce?", "The Legend of Zelda"),
            ("What is Mario’s brother’s name?", "Luigi"),
            (
                "In Overwatch, who says 'Cheers, love! The cavalry’s here!'",
                "Tracer",
            ),
            ("What company developed Halo?", "Bungie"),
        ],
    ),
    (
        "Anime",
        [
            ("Who is the creator of Dragon Ball?", "Akira Toriyama"),
            ("What village is Naruto from?", "Konoha"),
            ("Which anime features the Straw Hat Pirates?", "One Piece"),
            ("Who is known as the 'Fullmetal Alchemist'?", "Edward Elric"),
            ("What’s the name of the Titan-slaying weapon?", "ODM Gear"),
        ],
    ),
    (
        "Science",
        [
            ("What planet is known as the Red Planet?", "Mars"),
            (
                "What gas do plants absorb during photosynthesis?",
                "Carbon Dioxide",
            ),
            ("What is the chemical symbol for Gold?", "Au"),
            ("What part of the cell contains genetic material?", "Nucleus"),
            ("What is the speed of light?", "299,792 km/s"),
        ],
    ),
    (
        "Movies",
        [
            ("Who directed 'Jurassic Park'?", "Steven Spielberg"),
            ("What year was 'The Matrix' released?", "1999"),
            ("Who played Jack in 'Titanic'?", "Leonardo DiCaprio"),
            (
                "Which movie features the quote, 'Here's looking at you, kid'?",
                "Casablanca",
            ),
            ("Who voices Woody in Toy Story?", "Tom Hanks"),
        ],
    ),
    (
        "History",
        [
            (
                "Who was the first President of the United States?",
                "George Washington",
            ),
            ("In what year did World War II end?", "1945"),
            ("Which empire built the Colosseum?", "The Roman Empire"),
            ("Who discovered America in 1492?", "Christopher Columbus"),
            ("What wall fell in 1989?", "The Berlin Wall"),
        ],
    ),
    (
        "Math",
        [
            ("What is the square root of 64?", "8"),
            ("What is π (pi) rounded to 3 decimals?", "3.142"),
            ("What is 12 x 12?", "144"),
            ("What’s the value of 2³?", "8"),
            ("What is the name of a six-sided polygon?", "Hexagon"),
        ],
    ),
];

pub fn fallback_titles() -> Vec<&'static str> {
    FALLBACK_CATEGORIES.iter().map(|(title, _)| *title).collect()
}

pub fn is_fallback_title(title: &str) -> bool {
    FALLBACK_CATEGORIES.iter().any(|(t, _)| *t == title)
}

/// Fresh copy of every pool category, all clues hidden.
pub fn fallback_categories() -> Vec<Category> {
    FALLBACK_CATEGORIES.iter().map(build_category).collect()
}

/// One pool category picked uniformly at random.
pub fn random_fallback_category<R: Rng + ?Sized>(rng: &mut R) -> Category {
    build_category(&FALLBACK_CATEGORIES[rng.gen_range(0..FALLBACK_CATEGORIES.len())])
}

/// `count` distinct pool categories, in sampled order.
pub fn sample_fallback_categories<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Category> {
    sample_indices(FALLBACK_CATEGORIES.len(), count, rng)
        .into_iter()
        .map(|idx| build_category(&FALLBACK_CATEGORIES[idx]))
        .collect()
}

fn build_category(raw: &RawCategory) -> Category {
    let (title, clues) = raw;
    Category::new(
        *title,
        clues
            .iter()
            .map(|(question, answer)| Clue::new(*question, *answer))
            .collect(),
    )
}
