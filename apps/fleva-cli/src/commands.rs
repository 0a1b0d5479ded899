//! Command handlers.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use fleva_core::domain::{
    ImageUpload, Post, PostFields, PostId, PostOrder, PostUpdate, validate_post,
};
use fleva_core::{ImageStatus, Source, Sourced, Updated};

use crate::args::{Command, PostArgs, SortArg};
use crate::state::AppState;

/// Run one command against the configured client.
pub async fn run(state: &AppState, command: Command, json: bool) -> Result<()> {
    let out = Output { json };
    match command {
        Command::List { sort } => {
            let mut listed = state.client.list().await;
            if let Some(order) = order_for(sort) {
                order.sort(&mut listed.value);
            }
            out.posts(&listed);
        }
        Command::Show { id } => {
            let id = parse_id(&id);
            let found = state.client.get(&id).await;
            match &found.value {
                Some(post) => out.post(post, found.source),
                None => anyhow::bail!("post {} not found", id),
            }
        }
        Command::Create { fields, image } => {
            let post = to_fields(&fields).validated()?;
            let image = match image {
                Some(path) => Some(read_image(&path).await?),
                None => None,
            };
            let created = state.client.create(post, &state.actor, image).await;
            out.post(&created.value.post, created.source);
            out.image_status(&created.value.image);
        }
        Command::Update { id, fields } => {
            let input = to_fields(&fields);
            let errors = validate_post(&input);
            if !errors.is_empty() {
                return Err(errors.into());
            }
            let id = parse_id(&id);
            let updated = state
                .client
                .update(&id, PostUpdate::from_fields(&input), &state.actor)
                .await;
            match &updated.value {
                Updated::Record(post) => out.post(post, updated.source),
                Updated::Unpersisted { id, .. } => out.note(&format!(
                    "API unreachable and post {} is not stored locally; update not saved",
                    id
                )),
            }
        }
        Command::Delete { id } => {
            let id = parse_id(&id);
            state.client.delete(&id, &state.actor).await?;
            out.note(&format!("Deleted post {}", id));
        }
        Command::ImageUrl { id } => {
            println!("{}", state.client.image_url(&parse_id(&id)));
        }
    }
    Ok(())
}

fn order_for(sort: SortArg) -> Option<PostOrder> {
    match sort {
        SortArg::Server => None,
        SortArg::Recent => Some(PostOrder::Recent),
        SortArg::Score => Some(PostOrder::Score),
    }
}

fn to_fields(args: &PostArgs) -> PostFields {
    PostFields {
        title: Some(args.title.clone()),
        body: Some(args.body.clone()),
        tag: args.tag.clone(),
        anonymous: Some(!args.public),
        community: args.community.clone(),
    }
}

/// Ids minted offline keep their `post_` prefix; everything else came from the API.
fn parse_id(raw: &str) -> PostId {
    let raw = raw.trim();
    if raw.starts_with("post_") {
        PostId::Client(raw.to_string())
    } else {
        PostId::server(raw)
    }
}

async fn read_image(path: &Path) -> Result<ImageUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("upload.bin")
        .to_string();
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Ok(ImageUpload::new(file_name, bytes).with_content_type(mime.essence_str()))
}

fn source_label(source: Source) -> &'static str {
    match source {
        Source::Remote => "server",
        Source::LocalFallback => "offline copy",
    }
}

struct Output {
    json: bool,
}

impl Output {
    fn posts(&self, listed: &Sourced<Vec<Post>>) {
        if self.json {
            println!(
                "{}",
                json!({ "source": listed.source, "posts": listed.value })
            );
            return;
        }
        if listed.is_degraded() {
            eprintln!("API unreachable, showing posts saved on this device");
        }
        if listed.value.is_empty() {
            println!("No posts yet.");
        }
        for post in &listed.value {
            println!("{}", summary_line(post));
        }
    }

    fn post(&self, post: &Post, source: Source) {
        if self.json {
            println!("{}", json!({ "source": source, "post": post }));
            return;
        }
        println!("{}  [{}]", summary_line(post), source_label(source));
        if let Some(author) = post.visible_author() {
            println!("  by {}", author);
        }
        for line in post.content.lines() {
            println!("  {}", line);
        }
        if let Some(url) = &post.image_url {
            println!("  image: {}", url);
        }
    }

    fn image_status(&self, status: &ImageStatus) {
        match status {
            ImageStatus::NotRequested | ImageStatus::Attached => {}
            ImageStatus::Failed { reason } => {
                eprintln!("Post created, but the image upload failed: {}", reason)
            }
            ImageStatus::Skipped => {
                eprintln!("API unreachable, the image was not uploaded")
            }
        }
    }

    fn note(&self, message: &str) {
        if self.json {
            println!("{}", json!({ "message": message }));
        } else {
            println!("{}", message);
        }
    }
}

fn summary_line(post: &Post) -> String {
    let tag = post
        .primary_tag()
        .map(|t| format!(" #{}", t))
        .unwrap_or_default();
    format!(
        "{:<24} {} ({}{}) {:+} {}",
        post.id.as_str(),
        post.title,
        post.community,
        tag,
        post.score(),
        post.created_at.format("%Y-%m-%d %H:%M"),
    )
}
