//! Terminal rendering of marketplace records

use chrono::{DateTime, Utc};
use colored::Colorize;

use bazaar_core::{
    time_ago, ForumIndex, Notice, NoticeLevel, Plugin, PluginVersion, ProfileView, Reply, Review,
    TopicView, User,
};

/// Plain text of an HTML fragment: tags dropped, block ends become newlines
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut tag = String::new();
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                let name = tag
                    .trim_start_matches('/')
                    .split(|c: char| c.is_whitespace() || c == '/')
                    .next()
                    .unwrap_or("")
                    .to_lowercase();
                let block_end = tag.starts_with('/')
                    && matches!(name.as_str(), "p" | "div" | "li" | "h1" | "h2" | "h3");
                if block_end || name == "br" {
                    out.push('\n');
                }
            }
            c if in_tag => tag.push(c),
            c => out.push(c),
        }
    }

    let text = out
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

pub fn price(plugin: &Plugin) -> String {
    if plugin.is_free() {
        "Free".to_string()
    } else {
        format!("${:.2}", plugin.price)
    }
}

pub fn stars(rating: f64) -> String {
    let full = rating.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(full), "☆".repeat(5 - full))
}

fn ago(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| time_ago(t, Utc::now())).unwrap_or_default()
}

fn author_name(author: Option<&bazaar_core::UserRef>) -> &str {
    author.map(|a| a.username.as_str()).unwrap_or("unknown")
}

pub fn plugin_row(plugin: &Plugin) {
    println!(
        "  {}  {}  {}  {} ({})  {} downloads",
        plugin.id.dimmed(),
        plugin.name.cyan().bold(),
        price(plugin).green(),
        stars(plugin.rating).yellow(),
        plugin.review_count,
        plugin.downloads
    );
}

pub fn plugin_list(title: &str, plugins: &[Plugin]) {
    println!();
    if plugins.is_empty() {
        println!("No plugins found.");
        println!();
        return;
    }
    println!("{} ({}):", title, plugins.len());
    println!();
    for plugin in plugins {
        plugin_row(plugin);
    }
    println!();
}

pub fn plugin_detail(plugin: &Plugin, related: &[Plugin]) {
    println!();
    println!("{}  {}", plugin.name.cyan().bold(), price(plugin).green());
    if let Some(author) = &plugin.author {
        println!("by {}", author.username);
    }
    println!(
        "{} ({} reviews)  {} downloads",
        stars(plugin.rating).yellow(),
        plugin.review_count,
        plugin.downloads
    );
    if let Some(category) = &plugin.category {
        println!("Category: {}", category);
    }
    if !plugin.tags.is_empty() {
        println!("Tags: {}", plugin.tags.join(", "));
    }
    if !plugin.supported_versions.is_empty() {
        println!("Minecraft: {}", plugin.supported_versions.join(", "));
    }
    if !plugin.contributors.is_empty() {
        let names: Vec<_> = plugin
            .contributors
            .iter()
            .map(|c| c.username.as_str())
            .collect();
        println!("Contributors: {}", names.join(", "));
    }

    let description = html_to_text(&plugin.description);
    if !description.is_empty() {
        println!();
        println!("{}", description);
    }

    version_history(&plugin.versions);

    if !related.is_empty() {
        println!();
        println!("Related plugins:");
        for plugin in related {
            plugin_row(plugin);
        }
    }
    println!();
}

fn version_history(versions: &[PluginVersion]) {
    if versions.is_empty() {
        return;
    }
    println!();
    println!("Versions:");
    for (i, version) in versions.iter().enumerate() {
        let label = if i == 0 {
            format!("{} (latest)", version.version_number).green().to_string()
        } else {
            version.version_number.clone()
        };
        println!("  {}  {}", label, ago(version.created_at).dimmed());
        if let Some(changelog) = version.changelog.as_deref().filter(|c| !c.is_empty()) {
            for line in changelog.lines() {
                println!("      {}", line);
            }
        }
    }
}

pub fn reviews(reviews: &[Review], own: Option<&Review>) {
    println!();
    if let Some(own) = own {
        println!("Your review: {} {}", stars(own.rating as f64).yellow(), own.content);
        println!();
    }
    if reviews.is_empty() {
        println!("No reviews yet.");
        println!();
        return;
    }
    for review in reviews {
        println!(
            "  {}  {}  {}  {}",
            review.id.dimmed(),
            stars(review.rating as f64).yellow(),
            author_name(review.author.as_ref()).cyan(),
            ago(review.created_at).dimmed()
        );
        if !review.content.is_empty() {
            println!("      {}", review.content);
        }
        println!("      {}", likes(review.like_count, review.liked));
    }
    println!();
}

fn likes(count: u32, liked: bool) -> String {
    let text = format!("♥ {}", count);
    if liked {
        text.red().to_string()
    } else {
        text.dimmed().to_string()
    }
}

pub fn forum_index(index: &ForumIndex) {
    println!();
    println!("Categories:");
    for category in &index.categories {
        let count = category
            .topic_count
            .map(|c| format!(" ({} topics)", c))
            .unwrap_or_default();
        println!("  {}  {}{}", category.id.dimmed(), category.name.cyan(), count);
        if let Some(description) = &category.description {
            println!("      {}", description);
        }
    }

    println!();
    println!("Recent topics:");
    if index.recent_topics.is_empty() {
        println!("  No topics yet.");
    }
    for topic in &index.recent_topics {
        let category = topic
            .category
            .as_ref()
            .and_then(|c| c.name())
            .map(|n| format!("[{}] ", n))
            .unwrap_or_default();
        println!(
            "  {}  {}{}  {}  {}",
            topic.id.dimmed(),
            category,
            topic.title.bold(),
            author_name(topic.author.as_ref()).cyan(),
            ago(topic.created_at).dimmed()
        );
    }
    println!();
}

pub fn topic(view: &TopicView) {
    let topic = &view.topic;
    println!();
    println!("{}", topic.title.cyan().bold());
    println!(
        "{}  {}",
        author_name(topic.author.as_ref()),
        ago(topic.created_at).dimmed()
    );
    println!();
    println!("{}", html_to_text(&topic.content));
    println!();
    println!("Replies ({}):", view.replies.len());
    for reply in &view.replies {
        reply_row(reply);
    }
    println!();
}

pub fn reply_row(reply: &Reply) {
    println!();
    println!(
        "  {}  {}  {}  {}",
        reply.id.dimmed(),
        author_name(reply.author.as_ref()).cyan(),
        ago(reply.created_at).dimmed(),
        likes(reply.like_count, reply.liked)
    );
    for line in html_to_text(&reply.content).lines() {
        println!("      {}", line);
    }
}

pub fn user(user: &User) {
    println!();
    match &user.title {
        Some(title) if !title.is_empty() => {
            println!("{}  {}", user.username.cyan().bold(), title.dimmed())
        }
        _ => println!("{}", user.username.cyan().bold()),
    }
    let fields = [
        ("Email", user.email.as_deref()),
        ("Location", user.location.as_deref()),
        ("Website", user.website.as_deref()),
        ("Avatar", user.avatar.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            println!("{}: {}", label, value);
        }
    }
    if let Some(created) = user.created_at {
        println!("Joined: {}", created.format("%Y-%m-%d"));
    }
    if let Some(bio) = user.bio.as_deref().filter(|b| !b.is_empty()) {
        println!();
        println!("{}", bio);
    }
}

pub fn profile(view: &ProfileView) {
    user(&view.user);
    plugin_list("Plugins", &view.plugins);
}

/// Print pending notices: successes on stdout, the rest on stderr
pub fn notices(notices: Vec<Notice>, quiet: bool) {
    for notice in notices {
        match notice.level {
            NoticeLevel::Success if !quiet => {
                println!("{} {}", "[OK]".green().bold(), notice.message)
            }
            NoticeLevel::Success => {}
            NoticeLevel::Info if !quiet => {
                println!("{} {}", "[INFO]".cyan().bold(), notice.message)
            }
            NoticeLevel::Info => {}
            NoticeLevel::Error => {
                eprintln!("{} {}", "[ERROR]".red().bold(), notice.message)
            }
        }
    }
}
