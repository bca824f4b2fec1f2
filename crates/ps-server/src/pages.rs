//! Server-rendered HTML for image pages.
//!
//! The page shows the picture itself, a copyable direct link, the upload
//! date, and the author. Comments load client-side from the JSON endpoint.
//! No template engine; the page is small enough to format directly.

/// Escape HTML special characters to prevent XSS attacks.
fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Data needed to render an image page.
#[derive(Debug, Clone)]
pub struct ImagePage<'a> {
    /// Validated image short code.
    pub id: &'a str,
    /// File name used in the direct link, e.g. `a1B2c3D4e5.png`.
    pub image_src: &'a str,
    /// Display date; callers substitute "Unknown Date" for missing values.
    pub uploaded_date: &'a str,
    /// Uploader's username.
    pub author: &'a str,
    /// Logged-in viewer, if any.
    pub viewer: Option<&'a str>,
}

/// Render the HTML page for an image.
pub fn render_image_page(page: &ImagePage) -> String {
    let escaped_id = html_escape(page.id);
    let escaped_src = html_escape(page.image_src);
    let escaped_date = html_escape(page.uploaded_date);
    let escaped_author = html_escape(page.author);

    let nav_user = match page.viewer {
        Some(name) => format!(
            r#"<span class="nav-user">Signed in as <strong>{}</strong></span>"#,
            html_escape(name)
        ),
        None => r#"<a class="nav-user" href="/login">Sign in</a>"#.to_string(),
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{escaped_id} - picstash</title>
    <style>
        * {{
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }}
        body {{
            background: #111418;
            color: #e6e6e6;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Ubuntu, sans-serif;
        }}
        header {{
            display: flex;
            justify-content: space-between;
            align-items: center;
            padding: 12px 24px;
            background: #191d23;
            border-bottom: 1px solid rgba(255, 255, 255, 0.08);
        }}
        header .brand {{
            font-weight: 700;
            color: #7aa2f7;
            text-decoration: none;
            font-size: 18px;
        }}
        .nav-user {{
            color: rgba(255, 255, 255, 0.7);
            font-size: 13px;
            text-decoration: none;
        }}
        main {{
            max-width: 900px;
            margin: 32px auto;
            padding: 0 16px;
        }}
        .frame {{
            background: #191d23;
            border: 1px solid rgba(255, 255, 255, 0.08);
            border-radius: 8px;
            padding: 16px;
            text-align: center;
        }}
        .frame img {{
            max-width: 100%;
            border-radius: 4px;
        }}
        .meta {{
            margin-top: 16px;
            font-size: 13px;
            line-height: 1.8;
            color: rgba(255, 255, 255, 0.7);
        }}
        .meta input {{
            width: 100%;
            background: #111418;
            color: #e6e6e6;
            border: 1px solid rgba(255, 255, 255, 0.15);
            border-radius: 4px;
            padding: 6px 8px;
            font-size: 12px;
        }}
        #comments {{
            margin-top: 24px;
        }}
        #comments h2 {{
            font-size: 15px;
            margin-bottom: 8px;
        }}
        .comment {{
            background: #191d23;
            border: 1px solid rgba(255, 255, 255, 0.08);
            border-radius: 6px;
            padding: 8px 12px;
            margin-bottom: 8px;
            font-size: 13px;
        }}
        .comment .who {{
            color: #7aa2f7;
            font-weight: 600;
        }}
        .comment .when {{
            color: rgba(255, 255, 255, 0.4);
            font-size: 11px;
            margin-left: 6px;
        }}
        .empty {{
            color: rgba(255, 255, 255, 0.4);
            font-size: 13px;
        }}
    </style>
</head>
<body>
    <header>
        <a class="brand" href="/">picstash</a>
        {nav_user}
    </header>
    <main>
        <div class="frame">
            <img src="/images/{escaped_src}" alt="{escaped_id}">
        </div>
        <div class="meta">
            Direct link<br>
            <input type="text" readonly value="/images/{escaped_src}">
            Uploaded <span>{escaped_date}</span> by <span>{escaped_author}</span>
        </div>
        <div id="comments">
            <h2>Comments</h2>
            <div class="empty" id="comments-status">Loading comments...</div>
            <div id="comments-list"></div>
        </div>
    </main>
    <script>
        const esc = (s) => {{
            const d = document.createElement('div');
            d.textContent = s;
            return d.innerHTML;
        }};
        fetch("/images/{escaped_id}/comments")
            .then((r) => r.json())
            .then((body) => {{
                const status = document.getElementById('comments-status');
                const list = document.getElementById('comments-list');
                if (!body.data || body.data.length === 0) {{
                    status.textContent = body.message || 'No comments yet.';
                    return;
                }}
                status.remove();
                for (const c of body.data) {{
                    const div = document.createElement('div');
                    div.className = 'comment';
                    div.innerHTML =
                        '<span class="who">' + esc(c.username) + '</span>' +
                        '<span class="when">' + esc(c.posted_date) + '</span><br>' +
                        esc(c.comment);
                    list.appendChild(div);
                }}
            }})
            .catch(() => {{
                document.getElementById('comments-status').textContent =
                    'Could not load comments.';
            }});
    </script>
</body>
</html>"##
    )
}
