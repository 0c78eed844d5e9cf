// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Project-wide finalization.
//!
//! Runs once, strictly after every input file has parsed, because
//! generated-id assignment and cross-class resolution need the whole
//! symbol universe:
//!
//! 1. every class without an explicit id gets one from the run allocator;
//! 2. the identifier-metadata headers of referenced classes flow into the
//!    implementation includes of the files referencing them;
//! 3. initializers whose value is still a template placeholder are
//!    collected up the ancestor chain and substituted from the class's
//!    own parameter bindings.

use dmgen_model::{CompilerContext, FileKind, ModelFile, Target};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ResolveError {
    /// A deferred template value was never bound by the time of final
    /// resolution.
    #[error("unresolved template parameter `{param}` in class `{class}`")]
    UnresolvedTemplateParameter { class: String, param: String },
}

/// Finalize every parsed file against the shared context.
pub fn finalize_project(
    ctx: &mut CompilerContext,
    files: &mut [ModelFile],
) -> Result<(), ResolveError> {
    // explicit ids are reserved before any automatic assignment
    for file in files.iter() {
        for data in file.symbols.iter() {
            if let Some(id) = data.id {
                ctx.data_ids.reserve(id);
            }
        }
    }

    for file in files.iter_mut() {
        info!(file = %file.path.display(), "process data file");
        assign_ids(ctx, file);
        propagate_reference_headers(file);
        resolve_template_initializers(file)?;
    }
    Ok(())
}

fn assign_ids(ctx: &mut CompilerContext, file: &mut ModelFile) {
    for data in file.symbols.iter_mut() {
        if data.id.is_none() {
            data.id = Some(ctx.data_ids.acquire());
            debug!(name = %data.name, id = data.id.unwrap_or(0), "assign data id");
        }
    }
}

/// The headers declared by `@identifier headers=(...)` on referenced
/// classes become implementation includes of the referencing file.
fn propagate_reference_headers(file: &mut ModelFile) {
    let rel_path = file.rel_path.clone();
    let refs = file.ref_classes.clone();
    for ref_id in refs {
        for target in Target::ALL {
            let headers: Vec<String> = file.symbols.get(ref_id).identifier_meta[target]
                .default_entry
                .headers
                .iter()
                .map(|h| format!("\"{rel_path}{h}\""))
                .collect();
            file.update_headers(target, FileKind::Impl, &headers);
        }
    }
}

fn resolve_template_initializers(file: &mut ModelFile) -> Result<(), ResolveError> {
    let ModelFile { symbols, arena, .. } = file;

    // collect initializers still carrying a placeholder from the
    // ancestor chain (shared members keep a single value slot)
    let mut inherited = Vec::new();
    for id in symbols.ids() {
        let mut found = Vec::new();
        let mut cur = symbols.get(id).direct_inherit;
        while let Some(pid) = cur {
            let parent = symbols.get(pid);
            for target in Target::ALL {
                for &m in &parent.members[target] {
                    if arena.get(m).value.starts_with('<') {
                        found.push(m);
                    }
                }
            }
            cur = parent.direct_inherit;
        }
        if !found.is_empty() {
            inherited.push((id, found));
        }
    }
    for (id, members) in inherited {
        symbols.get_mut(id).initializers.extend(members);
    }

    for id in symbols.ids() {
        let class = symbols.get(id).name.clone();
        let params = symbols.get(id).templates_params.clone();
        for m in symbols.get(id).initializers.clone() {
            let value = arena.get(m).value.clone();
            let Some(param) = value.strip_prefix('<').and_then(|v| v.strip_suffix('>')) else {
                continue;
            };
            if let Some(binding) = params.iter().find(|p| p.name == param) {
                if !binding.resolved {
                    return Err(ResolveError::UnresolvedTemplateParameter {
                        class,
                        param: param.to_string(),
                    });
                }
                arena.get_mut(m).value = binding.value.clone();
            }
            // a placeholder with no binding at all stays unresolved and
            // is skipped at emission (open template bases keep theirs)
        }
    }
    Ok(())
}
