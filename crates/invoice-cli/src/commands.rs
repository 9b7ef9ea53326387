use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use tracing::{debug, info, info_span, warn};

use invoice_cli::headers::read_headers;
use invoice_map::{
    MappingError, MappingRepository, MappingSession, MatchSuggester, SaveError, storage_key,
};
use invoice_model::{FieldCatalog, FieldCategory, HeaderMapping};

use crate::cli::{FieldsArgs, MapArgs, SuggestArgs};
use crate::summary::{apply_table_style, dim_cell, header_cell, required_cell};
use crate::types::{MapResult, SuggestResult};

pub fn run_fields(args: &FieldsArgs) -> Result<()> {
    let catalog = FieldCatalog::invoice();
    let category = args.category.map(FieldCategory::from);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Label"),
        header_cell("Section"),
        header_cell("Required"),
    ]);
    apply_table_style(&mut table);
    for field in catalog
        .iter()
        .filter(|f| category.is_none_or(|c| f.category == c))
    {
        table.add_row(vec![
            Cell::new(&field.id),
            Cell::new(&field.label),
            dim_cell(field.category.title()),
            required_cell(field.required),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_suggest(args: &SuggestArgs) -> Result<SuggestResult> {
    let headers = read_headers(&args.file)?;
    info!(file = %args.file.display(), headers = headers.len(), "read headers");

    let catalog = FieldCatalog::invoice();
    let suggestions = MatchSuggester::new(&catalog).suggest_all(&headers, &HeaderMapping::new());
    debug!(
        suggested = suggestions.len(),
        total = headers.len(),
        "computed suggestions"
    );

    Ok(SuggestResult {
        file: args.file.clone(),
        headers,
        suggestions,
    })
}

pub fn run_map(args: &MapArgs) -> Result<MapResult> {
    let span = info_span!("map", file = %args.file.display());
    let _guard = span.enter();

    let headers = read_headers(&args.file)?;
    info!(headers = headers.len(), "read headers");

    let repository = MappingRepository::new(&args.store)
        .with_context(|| format!("open mapping store: {}", args.store.display()))?;
    let key = storage_key(args.direction.into());
    let mut session = MappingSession::open(FieldCatalog::invoice(), headers, &repository, &key);

    // =========================================================================
    // Edits, in the order clear, set, skip, accept
    // =========================================================================
    for header in &args.clear {
        if !session.clear(header) {
            warn!(header = %header, "nothing to clear");
        }
    }

    let mut displaced = Vec::new();
    for (header, field) in &args.set {
        if args.force {
            let cleared = session
                .reassign_field(header, field)
                .with_context(|| format!("map '{header}' to '{field}'"))?;
            displaced.extend(cleared);
        } else {
            session
                .assign_field(header, field)
                .with_context(|| format!("map '{header}' to '{field}'"))?;
        }
    }

    for header in &args.skip {
        session
            .skip(header)
            .with_context(|| format!("skip '{header}'"))?;
    }

    let accepted = if args.accept_suggestions {
        session.accept_all_suggestions()
    } else {
        Vec::new()
    };

    session.set_filter(args.filter.into());
    session.set_sort(args.sort.into());
    session.set_search(args.search.as_str());

    // =========================================================================
    // Persist
    // =========================================================================
    let mut saved_to = None;
    let mut missing_required = Vec::new();

    if args.finalize {
        if args.dry_run {
            if let Err(MappingError::RequiredFieldsUnmapped(ids)) = session.finalize() {
                missing_required = ids;
            }
        } else {
            match session.save(&repository) {
                Ok(_) => saved_to = Some(repository.path_for(&key)),
                Err(SaveError::Incomplete(MappingError::RequiredFieldsUnmapped(ids))) => {
                    missing_required = ids;
                }
                Err(SaveError::Incomplete(error)) => return Err(error.into()),
                Err(SaveError::Storage(error)) => {
                    return Err(error).context("save mapping");
                }
            }
        }
    }

    // An incomplete mapping is still kept as a draft.
    if !args.dry_run && session.is_dirty() {
        session.flush(&repository).context("save mapping")?;
        saved_to = Some(repository.path_for(&key));
    }

    Ok(MapResult {
        file: args.file.clone(),
        session,
        accepted,
        displaced,
        saved_to,
        missing_required,
    })
}
