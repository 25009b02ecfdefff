//! HTML templates for the browser page.
//!
//! Templates are embedded at compile time using `include_str!`.

use crate::types::Task;

/// The task list page. `{{task_count}}` and `{{task_rows}}` are filled in by
/// [`render_index`].
pub const INDEX_TEMPLATE: &str = include_str!("templates/index.html");

/// Generic page for unknown routes.
pub const NOT_FOUND_TEMPLATE: &str = include_str!("templates/not_found.html");

/// Render the index page for the given tasks, in the order given.
pub fn render_index(tasks: &[Task]) -> String {
    let count = match tasks.iter().filter(|t| !t.completed).count() {
        1 => "1 task left".to_string(),
        n => format!("{} tasks left", n),
    };

    let rows = if tasks.is_empty() {
        r#"        <li class="empty-state">Nothing to do</li>"#.to_string()
    } else {
        tasks.iter().map(render_task_row).collect::<Vec<_>>().join("\n")
    };

    // Rows last, so user-supplied titles are never scanned for placeholders.
    INDEX_TEMPLATE
        .replace("{{task_count}}", &count)
        .replace("{{task_rows}}", &rows)
}

fn render_task_row(task: &Task) -> String {
    let (class, checked) = if task.completed {
        ("task done", " checked")
    } else {
        ("task", "")
    };
    format!(
        r#"        <li class="{class}" data-id="{id}"><input type="checkbox" class="toggle"{checked}><span class="title">{title}</span><button type="button" class="delete" aria-label="Delete">&times;</button></li>"#,
        class = class,
        id = task.id,
        checked = checked,
        title = html_escape(&task.title),
    )
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
