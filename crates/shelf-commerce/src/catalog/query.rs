//! Browse-page query: genre filter, text search, sort.

use crate::catalog::Book;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort options for the book list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    /// Sort by title A-Z.
    #[default]
    Title,
    /// Sort by author A-Z.
    Author,
    /// Sort by genre A-Z.
    Genre,
    /// Sort by price, low to high.
    PriceLow,
    /// Sort by price, high to low.
    PriceHigh,
}

impl SortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Title => "title",
            SortOption::Author => "author",
            SortOption::Genre => "genre",
            SortOption::PriceLow => "price-low",
            SortOption::PriceHigh => "price-high",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::Title => "Title",
            SortOption::Author => "Author",
            SortOption::Genre => "Genre",
            SortOption::PriceLow => "Price: Low to High",
            SortOption::PriceHigh => "Price: High to Low",
        }
    }

    fn compare(&self, a: &Book, b: &Book) -> Ordering {
        match self {
            SortOption::Title => compare_text(&a.title, &b.title),
            SortOption::Author => compare_text(&a.author, &b.author),
            SortOption::Genre => compare_text(&a.genre, &b.genre),
            SortOption::PriceLow => a.price.amount_cents.cmp(&b.price.amount_cents),
            SortOption::PriceHigh => b.price.amount_cents.cmp(&a.price.amount_cents),
        }
    }
}

/// Case-insensitive first, then exact, so "apple" and "Apple" sort together.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// A catalog query.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CatalogQuery {
    /// Exact genre to keep; `None` shows all genres.
    pub genre: Option<String>,
    /// Text matched against title, author and genre.
    pub search: Option<String>,
    /// Sort option.
    pub sort: SortOption,
}

impl CatalogQuery {
    /// Create a query that keeps everything, sorted by title.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one genre. `"all"` clears the filter.
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        let genre = genre.into();
        self.genre = if genre == "all" { None } else { Some(genre) };
        self
    }

    /// Set the search text.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Set sort option.
    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    /// Check whether a book passes the genre and search filters.
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(genre) = &self.genre {
            if &book.genre != genre {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                [&book.title, &book.author, &book.genre]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }

    /// Filter and sort `books`. The sort is stable.
    pub fn apply(&self, books: &[Book]) -> Vec<Book> {
        let mut filtered: Vec<Book> = books.iter().filter(|b| self.matches(b)).cloned().collect();
        filtered.sort_by(|a, b| self.sort.compare(a, b));
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProductId;
    use crate::money::Money;

    fn book(id: u64, title: &str, author: &str, genre: &str, price_cents: i64) -> Book {
        Book {
            id: ProductId::from(id),
            title: title.to_string(),
            author: author.to_string(),
            genre: genre.to_string(),
            pages: None,
            quantity: 5,
            price: Money::rand(price_cents),
        }
    }

    fn shelf() -> Vec<Book> {
        vec![
            book(1, "Organic Chemistry", "Clayden", "Science & Technology", 75000),
            book(2, "Things Fall Apart", "Achebe", "Literature & Fiction", 18000),
            book(3, "calculus", "Stewart", "Academic Textbooks", 89950),
            book(4, "Long Walk to Freedom", "Mandela", "History & Politics", 25000),
            book(5, "Principles of Economics", "Mankiw", "Business & Economics", 18000),
        ]
    }

    fn ids(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_default_sorts_by_title_case_insensitively() {
        let result = CatalogQuery::new().apply(&shelf());
        assert_eq!(ids(&result), vec!["3", "4", "1", "5", "2"]);
    }

    #[test]
    fn test_genre_filter_is_exact() {
        let query = CatalogQuery::new().with_genre("Academic Textbooks");
        assert_eq!(ids(&query.apply(&shelf())), vec!["3"]);

        let partial = CatalogQuery::new().with_genre("Academic");
        assert!(partial.apply(&shelf()).is_empty());

        let all = CatalogQuery::new().with_genre("all");
        assert_eq!(all.genre, None);
        assert_eq!(all.apply(&shelf()).len(), 5);
    }

    #[test]
    fn test_search_matches_title_author_genre() {
        let by_author = CatalogQuery::new().with_search("ACHEBE");
        assert_eq!(ids(&by_author.apply(&shelf())), vec!["2"]);

        let by_genre = CatalogQuery::new().with_search("economics");
        assert_eq!(ids(&by_genre.apply(&shelf())), vec!["5"]);

        let blank = CatalogQuery::new().with_search("   ");
        assert_eq!(blank.apply(&shelf()).len(), 5);
    }

    #[test]
    fn test_price_sort_is_stable() {
        let low = CatalogQuery::new().with_sort(SortOption::PriceLow).apply(&shelf());
        // Books 2 and 5 cost the same and keep their input order
        assert_eq!(ids(&low), vec!["2", "5", "4", "1", "3"]);

        let high = CatalogQuery::new().with_sort(SortOption::PriceHigh).apply(&shelf());
        assert_eq!(ids(&high), vec!["3", "1", "4", "2", "5"]);
    }

    #[test]
    fn test_filters_combine() {
        let query = CatalogQuery::new()
            .with_genre("Science & Technology")
            .with_search("chem")
            .with_sort(SortOption::Author);
        assert_eq!(ids(&query.apply(&shelf())), vec!["1"]);
    }

    #[test]
    fn test_sort_option_wire_names() {
        assert_eq!(serde_json::to_string(&SortOption::PriceLow).unwrap(), "\"price-low\"");
        assert_eq!(SortOption::PriceHigh.as_str(), "price-high");
        assert_eq!(SortOption::default().display_name(), "Title");
    }
}
