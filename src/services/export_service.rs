// src/services/export_service.rs

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_xlsxwriter::{Format, Workbook};

use crate::{
    common::error::AppError,
    db::SubmissionRepository,
    models::submission::Submission,
};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "Approved Submissions";

// Separador entre os campos da chave: evita que "ab"+"c" colida com "a"+"bc".
const KEY_SEPARATOR: char = '\u{1f}';

// (cabeçalho, largura da coluna)
const COLUMNS: [(&str, f64); 14] = [
    ("Title", 30.0),
    ("Description", 50.0),
    ("ImageURL", 40.0),
    ("Category", 15.0),
    ("OwnerName", 20.0),
    ("PhoneNumber", 15.0),
    ("City", 15.0),
    ("Area", 15.0),
    ("MapLink", 40.0),
    ("SocialLink", 40.0),
    ("ExpiryDate", 12.0),
    ("Status", 10.0),
    ("SubmittedAt", 20.0),
    ("CreatedAt", 25.0),
];

/// Intervalo de datas (inclusivo) aplicado ao `created_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, AppError> {
        Ok(Self {
            from: parse_day(from)?,
            to: parse_day(to)?,
        })
    }

    /// Início do primeiro dia.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.from.map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }

    /// Início do dia seguinte ao último (limite exclusivo). Cobre o último dia
    /// inteiro, inclusive frações de milissegundo.
    pub fn end_exclusive(&self) -> Option<DateTime<Utc>> {
        self.to
            .and_then(|d| d.succ_opt())
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }

    pub fn file_name(&self, today: NaiveDate) -> String {
        let fmt = |d: Option<NaiveDate>| {
            d.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "all".to_string())
        };
        format!(
            "approved_submissions_{}_to_{}_{}.xlsx",
            fmt(self.from),
            fmt(self.to),
            today.format("%Y-%m-%d")
        )
    }
}

fn parse_day(raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::InvalidDate(value.to_string())),
    }
}

/// Chave de deduplicação: título, responsável, telefone, cidade e bairro,
/// em minúsculas e sem espaços nas pontas. Campo ausente entra como vazio.
pub fn dedup_key(submission: &Submission) -> String {
    [
        &submission.title,
        &submission.owner_name,
        &submission.phone_number,
        &submission.city,
        &submission.area,
    ]
    .iter()
    .map(|field| field.as_deref().unwrap_or_default().trim().to_lowercase())
    .collect::<Vec<_>>()
    .join(&KEY_SEPARATOR.to_string())
}

/// Mantém a primeira ocorrência de cada chave. Com a lista ordenada
/// por `created_at DESC`, a primeira é a mais recente.
pub fn dedup(submissions: Vec<Submission>) -> Vec<Submission> {
    let mut seen = HashSet::new();
    submissions
        .into_iter()
        .filter(|s| seen.insert(dedup_key(s)))
        .collect()
}

/// Uma linha da planilha, na ordem das colunas.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRecord {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub category: String,
    pub owner_name: String,
    pub phone_number: String,
    pub city: String,
    pub area: String,
    pub map_link: String,
    pub social_link: String,
    pub expiry_date: String,
    pub status: String,
    pub submitted_at: String,
    pub created_at: String,
}

impl ExportRecord {
    fn cells(&self) -> [&str; 14] {
        [
            &self.title,
            &self.description,
            &self.image_url,
            &self.category,
            &self.owner_name,
            &self.phone_number,
            &self.city,
            &self.area,
            &self.map_link,
            &self.social_link,
            &self.expiry_date,
            &self.status,
            &self.submitted_at,
            &self.created_at,
        ]
    }
}

impl From<&Submission> for ExportRecord {
    fn from(s: &Submission) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let image_url = s
            .image_url
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .or(s.image.as_deref())
            .unwrap_or_default()
            .to_string();

        Self {
            title: text(&s.title),
            description: text(&s.description),
            image_url,
            category: text(&s.category),
            owner_name: text(&s.owner_name),
            phone_number: text(&s.phone_number),
            city: text(&s.city),
            area: text(&s.area),
            map_link: text(&s.map_link),
            social_link: text(&s.social_link),
            expiry_date: text(&s.expiry_date),
            status: s.status.to_string(),
            submitted_at: s.created_at.format("%d/%m/%Y %H:%M").to_string(),
            created_at: s.created_at.to_rfc3339(),
        }
    }
}

/// Gera o arquivo .xlsx com cabeçalho em negrito e larguras fixas.
pub fn build_workbook(records: &[ExportRecord]) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, (title, width)) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *title, &header)?;
        sheet.set_column_width(col, *width)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, value) in record.cells().iter().enumerate() {
            sheet.write_string(row, col as u16, *value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct ExportService {
    submission_repo: SubmissionRepository,
}

impl ExportService {
    pub fn new(submission_repo: SubmissionRepository) -> Self {
        Self { submission_repo }
    }

    // O status é sempre "approved", independente de outros filtros.
    pub async fn export_approved(&self, range: DateRange) -> Result<ExportFile, AppError> {
        let submissions = self
            .submission_repo
            .list_approved_between(range.start(), range.end_exclusive())
            .await?;

        let fetched = submissions.len();
        let unique = dedup(submissions);
        let records: Vec<ExportRecord> = unique.iter().map(ExportRecord::from).collect();

        tracing::info!(
            "📊 Exportação: {} submissões aprovadas, {} após deduplicação",
            fetched,
            records.len()
        );

        let bytes = build_workbook(&records)?;
        Ok(ExportFile {
            file_name: range.file_name(Utc::now().date_naive()),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::{tests::submission, SubmissionStatus};
    use chrono::Duration;

    #[test]
    fn later_duplicate_wins() {
        let t1 = Utc::now() - Duration::hours(2);
        let t2 = Utc::now();

        let mut older = submission("A", "X", SubmissionStatus::Approved);
        older.phone_number = Some("1".into());
        older.city = Some("C".into());
        older.area = Some("D".into());
        older.created_at = t1;
        older.description = Some("antiga".into());

        let mut newer = older.clone();
        newer.id = uuid::Uuid::new_v4();
        newer.created_at = t2;
        newer.description = Some("nova".into());

        // Ordem do banco: created_at DESC
        let result = dedup(vec![newer.clone(), older]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, newer.id);
        assert_eq!(result[0].created_at, t2);
    }

    #[test]
    fn key_ignores_case_and_surrounding_spaces() {
        let a = submission("Pizza Dobro", "Maria", SubmissionStatus::Approved);
        let mut b = a.clone();
        b.title = Some("  pizza dobro ".into());
        b.owner_name = Some("MARIA".into());
        assert_eq!(dedup_key(&a), dedup_key(&b));
    }

    #[test]
    fn missing_fields_do_not_merge_different_owners() {
        let mut a = submission("x", "Ana", SubmissionStatus::Approved);
        a.title = None;
        let mut b = a.clone();
        b.owner_name = Some("Bia".into());
        assert_ne!(dedup_key(&a), dedup_key(&b));
    }

    #[test]
    fn fields_do_not_bleed_into_each_other() {
        let a = submission("ab", "c", SubmissionStatus::Approved);
        let b = submission("a", "bc", SubmissionStatus::Approved);
        assert_ne!(dedup_key(&a), dedup_key(&b));
    }

    #[test]
    fn date_range_bounds_cover_whole_days() {
        let range = DateRange::parse(Some("2025-03-01"), Some("2025-03-31")).unwrap();
        assert_eq!(range.start().unwrap().to_rfc3339(), "2025-03-01T00:00:00+00:00");
        assert_eq!(
            range.end_exclusive().unwrap().to_rfc3339(),
            "2025-04-01T00:00:00+00:00"
        );
    }

    #[test]
    fn last_microsecond_of_the_day_is_inside_the_range() {
        let range = DateRange::parse(None, Some("2025-03-31")).unwrap();
        let late = "2025-03-31T23:59:59.999500Z".parse::<DateTime<Utc>>().unwrap();
        assert!(late < range.end_exclusive().unwrap());
    }

    #[test]
    fn empty_or_missing_bounds_are_open() {
        let range = DateRange::parse(None, Some("")).unwrap();
        assert_eq!(range, DateRange::default());
        assert!(range.start().is_none() && range.end_exclusive().is_none());
    }

    #[test]
    fn malformed_bounds_are_rejected() {
        assert!(matches!(
            DateRange::parse(Some("01/03/2025"), None),
            Err(AppError::InvalidDate(_))
        ));
    }

    #[test]
    fn file_name_encodes_range_and_day() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
        let range = DateRange::parse(Some("2025-03-01"), None).unwrap();
        assert_eq!(
            range.file_name(today),
            "approved_submissions_2025-03-01_to_all_2025-04-02.xlsx"
        );
    }

    #[test]
    fn record_prefers_image_url_column() {
        let mut s = submission("A", "X", SubmissionStatus::Approved);
        s.image = Some("https://img/fallback.png".into());
        assert_eq!(ExportRecord::from(&s).image_url, "https://img/fallback.png");
        s.image_url = Some("https://img/main.png".into());
        let record = ExportRecord::from(&s);
        assert_eq!(record.image_url, "https://img/main.png");
        assert_eq!(record.status, "approved");
    }

    #[test]
    fn workbook_is_a_zip_container() {
        let s = submission("A", "X", SubmissionStatus::Approved);
        let bytes = build_workbook(&[ExportRecord::from(&s)]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn export_covers_the_whole_last_day(pool: sqlx::PgPool) {
        // Três aprovadas (duas duplicadas), uma pendente e uma fora do intervalo.
        sqlx::query(
            r#"
            INSERT INTO submissions (title, owner_name, city, status, created_at) VALUES
                ('Pizza', 'Ana', 'Recife', 'approved', '2025-03-31 23:59:59.9995+00'),
                ('pizza ', 'ana', 'recife', 'approved', '2025-03-10 12:00:00+00'),
                ('Corte', 'Bia', 'Recife', 'approved', '2025-03-01 00:00:00+00'),
                ('Sushi', 'Caio', 'Recife', 'pending', '2025-03-15 12:00:00+00'),
                ('Tarde', 'Davi', 'Recife', 'approved', '2025-04-01 00:00:00+00')
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let repo = SubmissionRepository::new(pool.clone());
        let range = DateRange::parse(Some("2025-03-01"), Some("2025-03-31")).unwrap();

        let rows = repo
            .list_approved_between(range.start(), range.end_exclusive())
            .await
            .unwrap();
        let titles: Vec<&str> = rows.iter().filter_map(|s| s.title.as_deref()).collect();
        assert_eq!(titles, vec!["Pizza", "pizza ", "Corte"]);

        let unique = dedup(rows);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title.as_deref(), Some("Pizza"));

        let file = ExportService::new(repo).export_approved(range).await.unwrap();
        assert!(file.file_name.starts_with("approved_submissions_2025-03-01_to_2025-03-31_"));
        assert_eq!(&file.bytes[..2], b"PK");
    }
}
