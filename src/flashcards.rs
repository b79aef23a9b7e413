use crate::models::Flashcard;

/// A deck of term/definition cards browsed one at a time.
#[derive(Debug, Clone, Default)]
pub struct FlashcardDeck {
    cards: Vec<Flashcard>,
    current: usize,
    flipped: bool,
}

impl FlashcardDeck {
    pub fn new(cards: Vec<Flashcard>) -> Self {
        Self {
            cards,
            current: 0,
            flipped: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn current(&self) -> Option<&Flashcard> {
        self.cards.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Text on the visible face of the current card.
    pub fn visible_text(&self) -> Option<&str> {
        self.current().map(|card| {
            if self.flipped {
                card.definition.as_str()
            } else {
                card.term.as_str()
            }
        })
    }

    pub fn flip(&mut self) {
        if !self.is_empty() {
            self.flipped = !self.flipped;
        }
    }

    pub fn next(&mut self) {
        if self.is_empty() {
            return;
        }
        self.flipped = false;
        self.current = (self.current + 1) % self.cards.len();
    }

    pub fn prev(&mut self) {
        if self.is_empty() {
            return;
        }
        self.flipped = false;
        self.current = (self.current + self.cards.len() - 1) % self.cards.len();
    }

    /// "3 / 10", or "0 / 0" for an empty deck.
    pub fn progress_label(&self) -> String {
        if self.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.current + 1, self.cards.len())
        }
    }

    /// Fraction of the deck reached, for the progress bar.
    pub fn progress_ratio(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            (self.current + 1) as f64 / self.cards.len() as f64
        }
    }
}
