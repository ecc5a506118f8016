use scraper::{ElementRef, Html, Selector};

use crate::tables::TableSpec;
use crate::{Error, Result};

/// Rectangular table pulled out of a season page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExtractedTable {
    /// Appends a `season` column holding `label` on every row.
    pub fn with_season(mut self, label: &str) -> Self {
        self.columns.push("season".to_string());
        for row in &mut self.rows {
            row.push(label.to_string());
        }
        self
    }
}

/// What looking up one table spec in a page came back with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(ExtractedTable),
    /// The spec carries no container id.
    NoContainerId,
    NoContainer,
    /// The container (or the comment it wraps) holds no `<table>`.
    NoTable,
}

/// A parsed season page. Not `Send`, so it lives inside one blocking task.
pub struct SeasonPage {
    doc: Html,
}

impl SeasonPage {
    pub fn parse(html: &str) -> Self {
        Self {
            doc: Html::parse_document(html),
        }
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<ElementRef<'_>>> {
        let sel = create_selector(&format!(r#"[id="{id}"]"#))?;
        Ok(self.doc.select(&sel).next())
    }

    /// Finds the container, unwraps a comment child if there is one, and
    /// parses the first table inside.
    pub fn lookup(&self, spec: &TableSpec) -> Result<Lookup> {
        if spec.container_id.is_empty() {
            return Ok(Lookup::NoContainerId);
        }
        let Some(container) = self.find_by_id(spec.container_id)? else {
            return Ok(Lookup::NoContainer);
        };

        let table = match hidden_markup(container) {
            Some(markup) => {
                let fragment = Html::parse_fragment(&markup);
                match first_table(fragment.root_element())? {
                    Some(table) => Some(parse_table(table)?),
                    None => None,
                }
            }
            None => match first_table(container)? {
                Some(table) => Some(parse_table(table)?),
                None => None,
            },
        };

        Ok(table.map_or(Lookup::NoTable, Lookup::Found))
    }
}

/// Looks up every spec against one page, in order. Runs on the blocking pool.
pub(crate) async fn extract_page(
    html: String,
    specs: Vec<TableSpec>,
) -> Result<Vec<(TableSpec, Result<Lookup>)>> {
    let lookups = tokio::task::spawn_blocking(move || {
        let page = SeasonPage::parse(&html);
        specs
            .into_iter()
            .map(|spec| {
                let res = page.lookup(&spec);
                (spec, res)
            })
            .collect::<Vec<_>>()
    })
    .await?;
    Ok(lookups)
}

/// Text of the first comment among the container's direct children.
fn hidden_markup(container: ElementRef<'_>) -> Option<String> {
    container.children().find_map(|child| {
        child.value().as_comment().map(|comment| {
            let text: &str = comment;
            text.to_string()
        })
    })
}

fn first_table(scope: ElementRef<'_>) -> Result<Option<ElementRef<'_>>> {
    let sel = create_selector("table")?;
    Ok(scope.select(&sel).next())
}

/// Converts a `<table>` into columns and rows. Grouped header rows are
/// flattened into `Group_Leaf` names.
pub fn parse_table(table: ElementRef<'_>) -> Result<ExtractedTable> {
    let head_sel = create_selector("thead tr")?;
    let body_sel = create_selector("tbody tr")?;
    let row_sel = create_selector("tr")?;

    let mut head_rows: Vec<ElementRef> = table.select(&head_sel).collect();
    let mut body_rows: Vec<ElementRef> = table.select(&body_sel).collect();
    if head_rows.is_empty() {
        let mut rest = table
            .select(&row_sel)
            .filter(|r| !in_section(*r, "tfoot"));
        head_rows.extend(rest.next());
        body_rows = rest.collect();
    } else if body_rows.is_empty() {
        body_rows = table
            .select(&row_sel)
            .filter(|r| !in_section(*r, "thead") && !in_section(*r, "tfoot"))
            .collect();
    }

    let columns = header_names(&head_rows);
    if columns.is_empty() {
        return Err(Error::ParseEmptyHeader);
    }

    let width = columns.len();
    let rows = body_rows
        .into_iter()
        .filter(|row| !row.value().classes().any(|c| c == "thead"))
        .map(|row| {
            cells(row)
                .map(|(cell, _)| cell_text(cell))
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .map(|mut cells| {
            cells.resize(width, String::new());
            cells
        })
        .collect();

    Ok(ExtractedTable { columns, rows })
}

fn header_names(head_rows: &[ElementRef<'_>]) -> Vec<String> {
    let levels: Vec<Vec<String>> = head_rows
        .iter()
        .map(|row| {
            cells(*row)
                .flat_map(|(cell, span)| std::iter::repeat(cell_text(cell)).take(span))
                .collect()
        })
        .collect();

    let width = levels.iter().map(Vec::len).max().unwrap_or(0);
    (0..width)
        .map(|i| {
            let mut parts: Vec<&str> = Vec::new();
            for level in &levels {
                match level.get(i).map(String::as_str) {
                    Some(label) if !label.is_empty() && parts.last() != Some(&label) => {
                        parts.push(label)
                    }
                    _ => {}
                }
            }
            if parts.is_empty() {
                format!("Unnamed: {i}")
            } else {
                parts.join("_")
            }
        })
        .collect()
}

/// Direct `th`/`td` children with their colspan.
fn cells<'a>(row: ElementRef<'a>) -> impl Iterator<Item = (ElementRef<'a>, usize)> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "th" | "td"))
        .map(|el| {
            let span = el
                .value()
                .attr("colspan")
                .and_then(|s| s.trim().parse::<usize>().ok())
                .unwrap_or(1)
                .max(1);
            (el, span)
        })
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn in_section(row: ElementRef<'_>, section: &str) -> bool {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| el.value().name() == section)
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUAD_TABLE: &str = r#"
        <table id="stats_squads_defense_for">
          <thead>
            <tr class="over_header">
              <th colspan="2"></th>
              <th colspan="2">Tackles</th>
            </tr>
            <tr>
              <th>Squad</th><th>90s</th><th>Tkl</th><th>TklW</th>
            </tr>
          </thead>
          <tbody>
            <tr><th><a href="/squad/1">Arsenal</a></th><td>38.0</td><td>612</td><td>370</td></tr>
            <tr class="thead"><th>Squad</th><th>90s</th><th>Tkl</th><th>TklW</th></tr>
            <tr><th>Chelsea</th><td>38.0</td><td>
                590 </td><td>351</td></tr>
          </tbody>
        </table>"#;

    fn page_with(containers: &str) -> SeasonPage {
        SeasonPage::parse(&format!(
            "<html><body><div id=\"content\">{containers}</div></body></html>"
        ))
    }

    fn spec(container_id: &'static str) -> TableSpec {
        TableSpec::new("squad_defensive", "Squad Defensive Actions", container_id)
    }

    #[test]
    fn finds_table_directly_in_container() {
        let page = page_with(&format!(r#"<div id="all_stats_squads_defense">{SQUAD_TABLE}</div>"#));
        let Lookup::Found(table) = page.lookup(&spec("all_stats_squads_defense")).unwrap() else {
            panic!("table not found");
        };
        assert_eq!(
            table.columns,
            vec!["Squad", "90s", "Tackles_Tkl", "Tackles_TklW"]
        );
        assert_eq!(
            table.rows,
            vec![
                vec!["Arsenal", "38.0", "612", "370"],
                vec!["Chelsea", "38.0", "590", "351"],
            ]
        );
    }

    #[test]
    fn unwraps_table_hidden_in_comment() {
        let page = page_with(&format!(
            "<div id=\"all_stats_squads_defense\">\n<!--\n{SQUAD_TABLE}\n-->\n</div>"
        ));
        let lookup = page.lookup(&spec("all_stats_squads_defense")).unwrap();
        let Lookup::Found(table) = lookup else {
            panic!("comment was not unwrapped: {lookup:?}");
        };
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][0], "Chelsea");
    }

    #[test]
    fn finds_comment_among_other_children() {
        let page = page_with(&format!(
            r#"<div id="all_stats_squads_defense"><div class="placeholder"></div><!--{SQUAD_TABLE}--></div>"#
        ));
        assert!(matches!(
            page.lookup(&spec("all_stats_squads_defense")).unwrap(),
            Lookup::Found(_)
        ));
    }

    #[test]
    fn reports_missing_container_and_table() {
        let page = page_with(r#"<div id="all_stats_squads_defense"><!-- nothing here --></div>"#);
        assert_eq!(
            page.lookup(&spec("all_stats_squads_defense")).unwrap(),
            Lookup::NoTable
        );
        assert_eq!(
            page.lookup(&spec("all_stats_squads_possession")).unwrap(),
            Lookup::NoContainer
        );
        assert_eq!(page.lookup(&spec("")).unwrap(), Lookup::NoContainerId);
    }

    #[test]
    fn table_without_thead_uses_first_row() {
        let page = page_with(
            r#"<div id="box"><table>
                <tr><th>Rk</th><th>Squad</th><th></th></tr>
                <tr><td>1</td><td>Man City</td></tr>
                <tr><td>2</td><td>Arsenal</td><td>x</td><td>overflow</td></tr>
            </table></div>"#,
        );
        let Lookup::Found(table) = page.lookup(&spec("box")).unwrap() else {
            panic!("table not found");
        };
        assert_eq!(table.columns, vec!["Rk", "Squad", "Unnamed: 2"]);
        assert_eq!(
            table.rows,
            vec![vec!["1", "Man City", ""], vec!["2", "Arsenal", "x"]]
        );
    }

    #[test]
    fn empty_table_is_an_error() {
        let page = page_with(r#"<div id="box"><table></table></div>"#);
        assert!(matches!(
            page.lookup(&spec("box")),
            Err(Error::ParseEmptyHeader)
        ));
    }

    #[test]
    fn season_column_is_appended() {
        let table = ExtractedTable {
            columns: vec!["Squad".into()],
            rows: vec![vec!["Everton".into()]],
        }
        .with_season("2005-06");
        assert_eq!(table.columns, vec!["Squad", "season"]);
        assert_eq!(table.rows, vec![vec!["Everton", "2005-06"]]);
    }
}
