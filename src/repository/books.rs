//! Books repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    inventory,
    models::book::{Book, NewBook, UpdateBook},
};

const BOOK_COLUMNS: &str =
    "id, title, author, publisher, shelf, year, isbn, note, total_copies, available_copies";

/// Escape LIKE wildcards so the query is matched as a literal substring
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Lock a book row for the rest of the transaction
pub(crate) async fn lock_book(conn: &mut PgConnection, id: i32) -> AppResult<Option<Book>> {
    let book = sqlx::query_as::<_, Book>(&format!(
        "SELECT {} FROM books WHERE id = $1 FOR UPDATE",
        BOOK_COLUMNS
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(book)
}

/// Number of open loans referencing a book
pub(crate) async fn count_open_loans(conn: &mut PgConnection, book_id: i32) -> AppResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM loans WHERE book_id = $1 AND status = 'OPEN'",
    )
    .bind(book_id)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

/// Persist the current copy count of a book
pub(crate) async fn store_available(conn: &mut PgConnection, book: &Book) -> AppResult<()> {
    sqlx::query("UPDATE books SET available_copies = $1 WHERE id = $2")
        .bind(book.available_copies)
        .bind(book.id)
        .execute(conn)
        .await?;
    Ok(())
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    /// Search books by id, title, author, ISBN or shelf
    pub async fn search(&self, query: Option<&str>) -> AppResult<Vec<Book>> {
        let books = match query {
            Some(q) => {
                tracing::debug!("Book search: {}", q);
                sqlx::query_as::<_, Book>(&format!(
                    r#"
                    SELECT {} FROM books
                    WHERE CAST(id AS TEXT) ILIKE $1 ESCAPE '\'
                       OR title  ILIKE $1 ESCAPE '\'
                       OR author ILIKE $1 ESCAPE '\'
                       OR isbn   ILIKE $1 ESCAPE '\'
                       OR shelf  ILIKE $1 ESCAPE '\'
                    ORDER BY lower(title), id
                    "#,
                    BOOK_COLUMNS
                ))
                .bind(like_pattern(q))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Book>(&format!(
                    "SELECT {} FROM books ORDER BY lower(title), id",
                    BOOK_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(books)
    }

    /// Create a new book with all copies available
    pub async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let result = match book.id {
            Some(id) => {
                let query = format!(
                    r#"
                    INSERT INTO books (id, title, author, publisher, shelf, year, isbn, note,
                                       total_copies, available_copies)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
                    RETURNING {}
                    "#,
                    BOOK_COLUMNS
                );
                sqlx::query_as::<_, Book>(&query)
                    .bind(id)
                    .bind(&book.title)
                    .bind(&book.author)
                    .bind(&book.publisher)
                    .bind(&book.shelf)
                    .bind(book.year)
                    .bind(&book.isbn)
                    .bind(&book.note)
                    .bind(book.total_copies)
                    .fetch_one(&mut *tx)
                    .await
            }
            None => {
                let query = format!(
                    r#"
                    INSERT INTO books (title, author, publisher, shelf, year, isbn, note,
                                       total_copies, available_copies)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
                    RETURNING {}
                    "#,
                    BOOK_COLUMNS
                );
                sqlx::query_as::<_, Book>(&query)
                    .bind(&book.title)
                    .bind(&book.author)
                    .bind(&book.publisher)
                    .bind(&book.shelf)
                    .bind(book.year)
                    .bind(&book.isbn)
                    .bind(&book.note)
                    .bind(book.total_copies)
                    .fetch_one(&mut *tx)
                    .await
            }
        };

        let created = match result {
            Ok(created) => created,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(AppError::DuplicateId(format!(
                    "A book with id {} already exists",
                    book.id.unwrap_or_default()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        if book.id.is_some() {
            // Keep generated ids clear of explicit ones
            sqlx::query(
                "SELECT setval(pg_get_serial_sequence('books', 'id'), (SELECT MAX(id) FROM books))",
            )
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    /// Update a book; available copies are recomputed from open loans
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let mut book = lock_book(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
        let open_loans = count_open_loans(&mut tx, id).await?;

        book.apply_update(update);
        book.available_copies = inventory::recompute_available(book.total_copies, open_loans)?;

        let updated = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
               SET title = $1, author = $2, publisher = $3, shelf = $4, year = $5,
                   isbn = $6, note = $7, total_copies = $8, available_copies = $9
             WHERE id = $10
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(&book.shelf)
        .bind(book.year)
        .bind(&book.isbn)
        .bind(&book.note)
        .bind(book.total_copies)
        .bind(book.available_copies)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a book; its loans go with it through the foreign key cascade
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
