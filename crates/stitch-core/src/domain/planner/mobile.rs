//! Mobile client files.
//!
//! Everything under the entity directory is regenerated whole (`Replace`);
//! only `main.dart` is merged, so hand edits belong in locked files.

use super::{Plan, mapped_fields, tokens};
use crate::domain::anchor::AnchorStrategy;
use crate::domain::artifact::{ArtifactKind, ArtifactSpec};
use crate::domain::context::{GenerationContext, StateManager};
use crate::domain::entity::{Entity, Field};
use crate::domain::field_types::{self, TypeMapping};
use crate::domain::naming;
use crate::domain::render::{Fragment, TokenMap};
use std::path::PathBuf;

const MATERIAL_IMPORT: &str = "import 'package:flutter/material.dart';";

/// Lifecycle members the model carries in its own block.
const LIFECYCLE: &[&str] = &["enabled", "deleted", "created_on", "updated_on"];

fn entity_dir(ctx: &GenerationContext, entity: &Entity) -> PathBuf {
    ctx.mobile_entity_dir(&entity.namespace, &entity.name)
}

fn whole_file(
    ctx: &GenerationContext,
    entity: &Entity,
    kind: ArtifactKind,
    path: PathBuf,
    step: &'static str,
    template: &str,
    own: TokenMap,
) -> ArtifactSpec {
    ArtifactSpec::new(
        kind,
        entity.name.clone(),
        path,
        step,
        Fragment::template(template, tokens(ctx, entity, own)),
    )
    .anchor(AnchorStrategy::Replace)
}

fn lines(items: Vec<String>, indent: &str) -> Fragment {
    Fragment::indent(indent, Fragment::text(items.join("\n")))
}

fn lifecycle_fields(entity: &Entity) -> Vec<(&Field, &'static TypeMapping)> {
    entity
        .fields
        .iter()
        .filter(|f| LIFECYCLE.contains(&f.name.as_str()) || is_camel_timestamp(&f.name))
        .filter_map(|f| field_types::mapping_for(&f.type_tag).map(|m| (f, m)))
        .collect()
}

fn is_camel_timestamp(name: &str) -> bool {
    matches!(name, "createdOn" | "updatedOn")
}

/// `_invoiceFormDueDate`
fn controller_name(entity: &Entity, field: &Field) -> String {
    format!("_{}Form{}", naming::camel(&entity.name), naming::pascal(&field.name))
}

// ── Model ────────────────────────────────────────────────────────────────────

pub(super) fn model(ctx: &mut GenerationContext, entity: &Entity, plan: &mut Plan) {
    let user = mapped_fields(entity, plan);
    let lifecycle = lifecycle_fields(entity);

    let member = |(field, mapping): &(&Field, &TypeMapping)| {
        format!("{}? {};", mapping.mobile.primitive, naming::camel(&field.name))
    };
    let decode = |(field, mapping): &(&Field, &TypeMapping)| {
        mapping.mobile.decode_expr(&naming::camel(&field.name), &field.name)
    };
    let encode = |(field, mapping): &(&Field, &TypeMapping)| {
        let name = naming::camel(&field.name);
        if is_camel_timestamp(&name) {
            format!("'{}': {name}?.toString(),", field.name)
        } else {
            mapping.mobile.encode_expr(&name, &field.name)
        }
    };

    let constructor: Vec<String> = user
        .iter()
        .chain(&lifecycle)
        .map(|(f, _)| format!("this.{},", naming::camel(&f.name)))
        .collect();
    let string_return: Vec<String> = user
        .iter()
        .map(|(f, _)| {
            let name = naming::camel(&f.name);
            format!("{name}: ${name}")
        })
        .collect();

    let own = TokenMap::new()
        .with("$Attributes$", lines(user.iter().map(member).collect(), "  "))
        .with("$LifecycleAttributes$", lines(lifecycle.iter().map(member).collect(), "  "))
        .with("$ConstructorParams$", lines(constructor, "    "))
        .with("$ParserFromMap$", lines(user.iter().map(decode).collect(), "    "))
        .with("$LifecycleFromMap$", lines(lifecycle.iter().map(decode).collect(), "    "))
        .with("$ParserToMap$", lines(user.iter().map(encode).collect(), "    "))
        .with("$LifecycleToMap$", lines(lifecycle.iter().map(encode).collect(), "    "))
        .with("$StringReturn$", string_return.join(", "));

    let path = entity_dir(ctx, entity).join("model.dart");
    plan.push(whole_file(ctx, entity, ArtifactKind::MobileModel, path, "model", "mobile/model", own));
}

// ── Data ─────────────────────────────────────────────────────────────────────

pub(super) fn data(ctx: &mut GenerationContext, entity: &Entity, plan: &mut Plan) {
    let mut columns = vec!["id INTEGER PRIMARY KEY".to_string()];
    for (field, mapping) in mapped_fields(entity, plan).into_iter().chain(lifecycle_fields(entity)) {
        columns.push(format!("{} {}", field.name, mapping.mobile.storage));
    }

    let own = TokenMap::new().with("$TableColumns$", columns.join(", "));
    let path = entity_dir(ctx, entity).join("data.dart");
    plan.push(whole_file(ctx, entity, ArtifactKind::MobileData, path, "data", "mobile/data", own));
}

// ── Service ──────────────────────────────────────────────────────────────────

pub(super) fn service(ctx: &mut GenerationContext, entity: &Entity, plan: &mut Plan) {
    let path = entity_dir(ctx, entity).join("service.dart");
    plan.push(whole_file(
        ctx,
        entity,
        ArtifactKind::MobileService,
        path,
        "service",
        "mobile/service",
        TokenMap::new(),
    ));
}

// ── Pages ────────────────────────────────────────────────────────────────────

fn state_access(state: StateManager, entity: &Entity) -> String {
    let class = format!("{}{}", entity.name, state.class_suffix());
    match state {
        StateManager::Provider => format!("Provider.of<{class}>(context, listen: false)"),
        StateManager::MobX => format!("GetIt.I.get<{class}>()"),
        StateManager::Cubit => format!("context.read<{class}>()"),
    }
}

fn state_package_import(state: StateManager) -> &'static str {
    match state {
        StateManager::Provider => "import 'package:provider/provider.dart';",
        StateManager::MobX => "import 'package:get_it/get_it.dart';",
        StateManager::Cubit => "import 'package:flutter_bloc/flutter_bloc.dart';",
    }
}

pub(super) fn pages(ctx: &mut GenerationContext, entity: &Entity, plan: &mut Plan) {
    let kind = ArtifactKind::MobilePages;
    let dir = entity_dir(ctx, entity).join("pages");
    let target = format!("_{}", naming::camel(&entity.name));
    let fields = mapped_fields(entity, plan);

    let mut controllers = Vec::new();
    let mut inputs = Vec::new();
    let mut reads = Vec::new();
    let mut clears = Vec::new();
    let mut edits = Vec::new();
    for (field, mapping) in &fields {
        let controller = controller_name(entity, field);
        let name = naming::camel(&field.name);

        controllers.push(format!("final {controller} = TextEditingController();"));
        inputs.push(Fragment::template(
            mapping.mobile.widget,
            TokenMap::new()
                .with("$controller$", controller.clone())
                .with("$Field$", field.display_label().replace("R$", "R\\$")),
        ));
        reads.push(mapping.mobile.form_read_expr(&target, &name, &controller));
        clears.push(format!("{controller}.clear();"));
        edits.push(format!("{controller}.text = {target}.{name}?.toString() ?? \"\";"));
    }

    let state = ctx.state_manager;
    let page_tokens = TokenMap::new()
        .with("$StateAccess$", state_access(state, entity))
        .with("$StateImport$", state_package_import(state));

    let form_tokens = page_tokens
        .clone()
        .with("$Attributes$", lines(controllers, "  "))
        .with("$Form$", Fragment::indent("              ", Fragment::join(inputs, "\n")))
        .with("$AttributesData$", lines(reads, "      "))
        .with("$ClearData$", lines(clears, "    "))
        .with("$EditedAttributes$", lines(edits, "    "));

    for name in ["create", "update"] {
        plan.push(whole_file(
            ctx,
            entity,
            kind,
            dir.join(format!("{name}.dart")),
            name,
            &format!("mobile/pages/{name}"),
            form_tokens.clone(),
        ));
    }
    for name in ["detail", "index", "list", "widget"] {
        plan.push(whole_file(
            ctx,
            entity,
            kind,
            dir.join(format!("{name}.dart")),
            name,
            &format!("mobile/pages/{name}"),
            page_tokens.clone(),
        ));
    }
}

// ── State ────────────────────────────────────────────────────────────────────

pub(super) fn state(ctx: &mut GenerationContext, entity: &Entity, plan: &mut Plan) {
    let kind = ArtifactKind::MobileState;
    let dir = entity_dir(ctx, entity);
    let state = ctx.state_manager;

    plan.push(whole_file(
        ctx,
        entity,
        kind,
        dir.join(state.file_name()),
        "state",
        &format!("mobile/state/{}", state.as_str()),
        TokenMap::new(),
    ));
    if state == StateManager::Cubit {
        plan.push(whole_file(
            ctx,
            entity,
            kind,
            dir.join("state.dart"),
            "cubit-state",
            "mobile/state/cubit_state",
            TokenMap::new(),
        ));
    }
}

// ── Registration ─────────────────────────────────────────────────────────────

pub(super) fn registration(ctx: &mut GenerationContext, entity: &Entity, plan: &mut Plan) {
    let kind = ArtifactKind::MobileRegistration;
    let state = ctx.state_manager;
    let main = ctx.mobile_main();
    let class = format!("{}{}", entity.name, state.class_suffix());

    plan.push(
        ArtifactSpec::new(
            kind,
            entity.name.clone(),
            ctx.mobile_root.join("lib").join("utils").join("util.dart"),
            "util",
            Fragment::template("mobile/util", tokens(ctx, entity, TokenMap::new())),
        )
        .anchor(AnchorStrategy::CreateOnly),
    );
    plan.push(
        ArtifactSpec::new(
            kind,
            entity.name.clone(),
            main.clone(),
            "main",
            Fragment::template(
                format!("mobile/main/{}", state.as_str()).as_str(),
                tokens(ctx, entity, TokenMap::new()),
            ),
        )
        .anchor(AnchorStrategy::CreateOnly),
    );

    let import = format!(
        "import 'apps/{}/{}/{}';",
        entity.namespace.to_lowercase(),
        entity.name.to_lowercase(),
        state.file_name()
    );
    plan.push(
        ArtifactSpec::new(kind, entity.name.clone(), main.clone(), "import", Fragment::text(import.clone()))
            .skip_if_contains(import)
            .anchor(AnchorStrategy::insert_block(MATERIAL_IMPORT)),
    );

    let (line, anchor) = match state {
        StateManager::Provider => (
            format!("        ChangeNotifierProvider<{class}>(create: (_) => {class}()),"),
            "providers: [",
        ),
        StateManager::Cubit => (
            format!("        BlocProvider<{class}>(create: (_) => {class}()),"),
            "providers: [",
        ),
        StateManager::MobX => (
            format!("  getIt.registerSingleton<{class}>({class}());"),
            "void setupLocator() {",
        ),
    };
    let marker = line.trim().to_string();
    plan.push(
        ArtifactSpec::new(kind, entity.name.clone(), main, "register", Fragment::text(line))
            .skip_if_contains(marker)
            .anchor(AnchorStrategy::insert_block(anchor)),
    );
}
