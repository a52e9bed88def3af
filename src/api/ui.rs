use std::path::Path;

use axum::{response::Html, routing::get, Router};
use tower_http::services::ServeDir;
use tracing::info;

use super::AppState;

const DASHBOARD_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Telemetry Dashboard</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Helvetica Neue', Arial, sans-serif;
            background: #f5f7fa;
            min-height: 100vh;
            padding: 24px;
            color: #1a202c;
        }
        .container { max-width: 1100px; margin: 0 auto; }
        header {
            background: white;
            padding: 24px 32px;
            border-radius: 8px;
            box-shadow: 0 1px 3px rgba(0,0,0,0.06);
            margin-bottom: 24px;
            border: 1px solid #e2e8f0;
        }
        h1 {
            color: #2d3748;
            font-size: 24px;
            font-weight: 600;
            margin-bottom: 4px;
            letter-spacing: -0.025em;
        }
        h2 {
            font-size: 18px;
            font-weight: 600;
            color: #2d3748;
            margin: 24px 0 12px;
        }
        h4 {
            font-size: 14px;
            color: #4a5568;
            margin: 16px 0 8px;
        }
        .subtitle {
            color: #718096;
            font-size: 14px;
        }
        code, pre {
            font-family: 'SF Mono', Monaco, Menlo, monospace;
            font-size: 12px;
        }
        .event {
            background: white;
            border-radius: 6px;
            padding: 12px;
            margin-bottom: 8px;
            border: 1px solid #e2e8f0;
            border-left: 4px solid #3182ce;
        }
        .timestamp {
            font-size: 11px;
            color: #718096;
            margin-bottom: 4px;
        }
        .event-type {
            font-weight: 600;
            color: #2b6cb0;
            margin-bottom: 8px;
        }
        pre {
            background: #f7fafc;
            padding: 10px;
            border-radius: 4px;
            overflow-x: auto;
        }
        table {
            border-collapse: collapse;
            background: white;
            border: 1px solid #e2e8f0;
        }
        th, td {
            border: 1px solid #e2e8f0;
            padding: 8px 16px;
            text-align: center;
            font-size: 14px;
        }
        th {
            background: #3182ce;
            color: white;
            font-weight: 500;
        }
        .empty-state {
            padding: 24px;
            color: #a0aec0;
            font-size: 14px;
        }
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>Telemetry Dashboard</h1>
            <p class="subtitle">Capture endpoint: <code>POST /capture/</code> &middot; batch: <code>POST /batch/</code></p>
        </header>

        <h2>Recent Events</h2>
        <div id="events" class="empty-state">Loading...</div>

        <h2>Metrics (Accepted vs Rejected)</h2>
        <div id="metrics" class="empty-state">Loading...</div>
    </div>

    <script>
        function escapeHtml(text) {
            return String(text)
                .replace(/&/g, '&amp;')
                .replace(/</g, '&lt;')
                .replace(/>/g, '&gt;');
        }

        async function loadEvents() {
            const container = document.getElementById('events');
            try {
                const response = await fetch('/api/events');
                const events = await response.json();

                if (events.length === 0) {
                    container.className = 'empty-state';
                    container.innerHTML = 'No events yet.';
                    return;
                }

                container.className = '';
                container.innerHTML = events.map(ev => `
                    <div class="event">
                        <div class="timestamp">${escapeHtml(ev.timestamp)}</div>
                        <div class="event-type">${escapeHtml(ev.event)}</div>
                        <pre>${escapeHtml(JSON.stringify(ev, null, 2))}</pre>
                    </div>
                `).join('');
            } catch (err) {
                container.className = 'empty-state';
                container.innerHTML = 'Error loading events';
            }
        }

        async function loadStats() {
            const container = document.getElementById('metrics');
            try {
                const response = await fetch('/stats');
                const stats = await response.json();
                const accepted = stats.accepted || {};
                const rejected = stats.rejected || {};
                const totals = stats.totals || {};

                container.className = '';
                container.innerHTML = `
                    <table>
                        <thead><tr><th>Metric</th><th>Accepted</th><th>Rejected</th></tr></thead>
                        <tbody>
                            <tr><td>Options</td><td>${accepted.option_selected ?? 0}</td><td>${rejected.options_ignored ?? 0}</td></tr>
                            <tr><td>Thumbs</td><td>${accepted.thumbs_up ?? 0}</td><td>${rejected.thumbs_down ?? 0}</td></tr>
                        </tbody>
                    </table>
                    <h4>Event Totals</h4>
                    <pre>${escapeHtml(JSON.stringify(totals, null, 2))}</pre>
                `;
            } catch (err) {
                container.className = 'empty-state';
                container.innerHTML = 'Error loading metrics';
            }
        }

        loadEvents();
        loadStats();
        setInterval(loadEvents, 5000);
        setInterval(loadStats, 10000);
    </script>
</body>
</html>
"#;

pub async fn dashboard_handler() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

/// Serves the prebuilt bundle when `static_dir` exists, otherwise the
/// embedded dashboard at `/`.
pub fn attach(router: Router<AppState>, static_dir: &Path) -> Router<AppState> {
    if static_dir.is_dir() {
        info!("Serving dashboard bundle from {}", static_dir.display());
        router.fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
    } else {
        info!("No dashboard bundle at {}, serving built-in page", static_dir.display());
        router.route("/", get(dashboard_handler))
    }
}
