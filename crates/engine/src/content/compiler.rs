use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use tracing::{debug, info};

use crate::app::{EntityKind, RenderableKind, Vec2};
use crate::AppPaths;

use super::database::{DefDatabase, EntityArchetype, EntityDefId};

const SPRITE_PREFIX: &str = "Sprite:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    MissingContentDir,
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownDefType,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateDef,
}

#[derive(Debug, Clone)]
pub struct ContentCompileError {
    pub code: ContentErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for ContentCompileError {}

/// Compiles every `*.xml` file under the base content directory, in sorted
/// relative-path order, into one database.
pub fn compile_def_database(app_paths: &AppPaths) -> Result<DefDatabase, ContentCompileError> {
    let root = &app_paths.base_content_dir;
    if !root.is_dir() {
        return Err(ContentCompileError {
            code: ContentErrorCode::MissingContentDir,
            message: format!("content directory not found at {}", root.display()),
            file_path: root.clone(),
            location: None,
        });
    }

    let xml_files =
        collect_xml_files_sorted(root).map_err(|error| read_error(error.path, error.source))?;
    let mut sources = Vec::with_capacity(xml_files.len());
    for xml_file in xml_files {
        let raw = fs::read_to_string(&xml_file)
            .map_err(|source_err| read_error(xml_file.clone(), source_err))?;
        sources.push((xml_file, raw));
    }

    let db = compile_def_sources(
        sources
            .iter()
            .map(|(path, raw)| (path.as_path(), raw.as_str())),
    )?;
    info!(
        content_dir = %root.display(),
        def_count = db.entity_defs().len(),
        "content_compiled"
    );
    Ok(db)
}

/// Compiles already-loaded XML documents. Each def name may appear only once
/// across all sources; ids are assigned in def name order.
pub fn compile_def_sources<'a>(
    sources: impl IntoIterator<Item = (&'a Path, &'a str)>,
) -> Result<DefDatabase, ContentCompileError> {
    let mut merged = BTreeMap::<String, EntityArchetype>::new();
    for (file_path, raw) in sources {
        let defs = parse_defs_document(file_path, raw)?;
        debug!(file = %file_path.display(), def_count = defs.len(), "content_file_parsed");
        for def in defs {
            if merged.contains_key(&def.def_name) {
                return Err(ContentCompileError {
                    code: ContentErrorCode::DuplicateDef,
                    message: format!(
                        "duplicate EntityDef '{}'; each defName may be defined only once",
                        def.def_name
                    ),
                    file_path: file_path.to_path_buf(),
                    location: None,
                });
            }
            merged.insert(def.def_name.clone(), def);
        }
    }

    Ok(DefDatabase::from_entity_defs(
        merged.into_values().collect::<Vec<_>>(),
    ))
}

fn parse_defs_document(
    file_path: &Path,
    raw: &str,
) -> Result<Vec<EntityArchetype>, ContentCompileError> {
    let doc = Document::parse(raw).map_err(|error| ContentCompileError {
        code: ContentErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "Defs" {
        return Err(error_at_node(
            ContentErrorCode::InvalidRoot,
            "root element must be <Defs>".to_string(),
            file_path,
            &doc,
            root,
        ));
    }

    let mut defs = Vec::<EntityArchetype>::new();
    for child in root.children().filter(|node| node.is_element()) {
        if child.tag_name().name() != "EntityDef" {
            return Err(error_at_node(
                ContentErrorCode::UnknownDefType,
                format!(
                    "unsupported def type <{}>; only <EntityDef> is supported",
                    child.tag_name().name()
                ),
                file_path,
                &doc,
                child,
            ));
        }
        defs.push(parse_entity_def(file_path, &doc, child)?);
    }

    Ok(defs)
}

fn parse_entity_def(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> Result<EntityArchetype, ContentCompileError> {
    let mut seen_fields = HashSet::<String>::new();
    let mut def_name: Option<String> = None;
    let mut label: Option<String> = None;
    let mut kind: Option<EntityKind> = None;
    let mut renderable: Option<RenderableKind> = None;
    let mut width: Option<f32> = None;
    let mut height: Option<f32> = None;
    let mut lifetime_seconds: Option<f32> = None;

    for field in node.children().filter(|child| child.is_element()) {
        let field_name = field.tag_name().name().to_string();
        if !seen_fields.insert(field_name.clone()) {
            return Err(error_at_node(
                ContentErrorCode::DuplicateField,
                format!("duplicate field <{}> in <EntityDef>", field_name),
                file_path,
                doc,
                field,
            ));
        }

        match field_name.as_str() {
            "defName" => {
                def_name = Some(required_text(file_path, doc, field, "defName")?);
            }
            "label" => {
                label = Some(required_text(file_path, doc, field, "label")?);
            }
            "kind" => {
                let value = required_text(file_path, doc, field, "kind")?;
                let parsed = match value.as_str() {
                    "Breakable" => EntityKind::Breakable,
                    "Solid" => EntityKind::Solid,
                    "Effect" => EntityKind::Effect,
                    _ => {
                        return Err(error_at_node(
                            ContentErrorCode::InvalidValue,
                            format!(
                                "invalid kind '{}'; allowed values: Breakable, Solid, Effect",
                                value
                            ),
                            file_path,
                            doc,
                            field,
                        ))
                    }
                };
                kind = Some(parsed);
            }
            "renderable" => {
                let value = required_text(file_path, doc, field, "renderable")?;
                renderable = Some(parse_renderable(&value).ok_or_else(|| {
                    error_at_node(
                        ContentErrorCode::InvalidValue,
                        format!(
                            "invalid renderable '{}'; allowed values: Placeholder, Sprite:<key>",
                            value
                        ),
                        file_path,
                        doc,
                        field,
                    )
                })?);
            }
            "width" => {
                width = Some(parse_non_negative(file_path, doc, field, "width")?);
            }
            "height" => {
                height = Some(parse_non_negative(file_path, doc, field, "height")?);
            }
            "lifetimeSeconds" => {
                let value = parse_non_negative(file_path, doc, field, "lifetimeSeconds")?;
                if value <= 0.0 {
                    return Err(error_at_node(
                        ContentErrorCode::InvalidValue,
                        "lifetimeSeconds must be > 0".to_string(),
                        file_path,
                        doc,
                        field,
                    ));
                }
                lifetime_seconds = Some(value);
            }
            _ => {
                return Err(error_at_node(
                    ContentErrorCode::UnknownField,
                    format!("unknown field <{}> in <EntityDef>", field_name),
                    file_path,
                    doc,
                    field,
                ))
            }
        }
    }

    let Some(def_name) = def_name else {
        return Err(missing_field(file_path, doc, node, "defName"));
    };
    let Some(label) = label else {
        return Err(missing_field(file_path, doc, node, "label"));
    };
    let Some(kind) = kind else {
        return Err(missing_field(file_path, doc, node, "kind"));
    };
    let size = match (width, height) {
        (Some(x), Some(y)) => Some(Vec2 { x, y }),
        (None, None) => None,
        (Some(_), None) => return Err(missing_field(file_path, doc, node, "height")),
        (None, Some(_)) => return Err(missing_field(file_path, doc, node, "width")),
    };

    Ok(EntityArchetype {
        id: EntityDefId(0),
        def_name,
        label,
        kind,
        renderable,
        size,
        lifetime_seconds,
    })
}

fn parse_renderable(value: &str) -> Option<RenderableKind> {
    if value == "Placeholder" {
        return Some(RenderableKind::Placeholder);
    }
    let key = value.strip_prefix(SPRITE_PREFIX)?.trim();
    (!key.is_empty()).then(|| RenderableKind::Sprite(key.to_string()))
}

fn parse_non_negative(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> Result<f32, ContentCompileError> {
    let value = required_text(file_path, doc, node, field_name)?;
    let parsed = value.parse::<f32>().map_err(|_| {
        error_at_node(
            ContentErrorCode::InvalidValue,
            format!("{} '{}' is not a valid number", field_name, value),
            file_path,
            doc,
            node,
        )
    })?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(error_at_node(
            ContentErrorCode::InvalidValue,
            format!("{} must be finite and >= 0", field_name),
            file_path,
            doc,
            node,
        ));
    }
    Ok(parsed)
}

fn required_text(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> Result<String, ContentCompileError> {
    let value = node.text().map(str::trim).unwrap_or_default().to_string();
    if value.is_empty() {
        return Err(error_at_node(
            ContentErrorCode::MissingField,
            format!("field <{}> must not be empty", field_name),
            file_path,
            doc,
            node,
        ));
    }
    Ok(value)
}

fn missing_field(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> ContentCompileError {
    error_at_node(
        ContentErrorCode::MissingField,
        format!("missing required field <{}> in <EntityDef>", field_name),
        file_path,
        doc,
        node,
    )
}

fn error_at_node(
    code: ContentErrorCode,
    message: String,
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> ContentCompileError {
    let pos = doc.text_pos_at(node.range().start);
    ContentCompileError {
        code,
        message,
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }),
    }
}

struct ReadError {
    path: PathBuf,
    source: std::io::Error,
}

fn collect_xml_files_sorted(root: &Path) -> Result<Vec<PathBuf>, ReadError> {
    let mut files = Vec::<PathBuf>::new();
    collect_recursive(root, &mut files)?;
    files.sort_by_key(|path| normalize_rel_path(path.strip_prefix(root).unwrap_or(path.as_path())));
    Ok(files)
}

fn collect_recursive(current: &Path, files: &mut Vec<PathBuf>) -> Result<(), ReadError> {
    let entries = fs::read_dir(current).map_err(|source| ReadError {
        path: current.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ReadError {
            path: current.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(&path, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        {
            files.push(path);
        }
    }
    Ok(())
}

fn normalize_rel_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn read_error(path: PathBuf, source: std::io::Error) -> ContentCompileError {
    ContentCompileError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read XML file: {source}"),
        file_path: path,
        location: None,
    }
}
