use tera::Tera;

/// All pages, compiled in so the binary runs from any directory.
pub fn build() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", BASE_HTML),
        ("report_body.html", REPORT_BODY_HTML),
        ("dashboard.html", DASHBOARD_HTML),
        ("upload.html", UPLOAD_HTML),
    ])?;
    Ok(tera)
}

pub static BASE_HTML: &str = r###"
<!doctype html>
<html>
<head>
  <meta charset="utf-8">
  <title>{% block title %}Traffic dashboard{% endblock title %}</title>
  <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
</head>
<body>
  <nav><a href="/">Dashboard</a> | <a href="/upload">Upload or fetch a log</a></nav>
  {% block content %}{% endblock content %}
</body>
</html>
"###;

pub static DASHBOARD_HTML: &str = r###"{% extends "base.html" %}
{% block title %}Traffic dashboard: {{ source }}{% endblock title %}
{% block content %}
  <h2>Traffic dashboard</h2>
  <p>Source: <code>{{ source }}</code>, generated {{ generated_at }}</p>
  {% include "report_body.html" %}
{% endblock content %}
"###;

pub static REPORT_BODY_HTML: &str = r###"
<p>{{ total }} requests, {{ report.lines_skipped }} of {{ report.lines_read }} lines skipped</p>
{% if is_empty %}
  <p>No requests matched the access-log format.</p>
{% else %}
  <h3>IP Address Histogram</h3>
  <canvas id="ip-chart"></canvas>
  <h3>Hourly Traffic Histogram</h3>
  <canvas id="hour-chart"></canvas>
  <script>
    new Chart(document.getElementById("ip-chart"), {
      type: "bar",
      data: {
        labels: {{ ip_labels_json | safe }},
        datasets: [ { label: "Occurrences", data: {{ ip_counts_json | safe }} } ]
      },
      options: { plugins: { title: { display: true, text: "IP Address Histogram" } } }
    });
    new Chart(document.getElementById("hour-chart"), {
      type: "bar",
      data: {
        labels: {{ hour_labels_json | safe }},
        datasets: [ { label: "Visitors", data: {{ hour_counts_json | safe }} } ]
      },
      options: { plugins: { title: { display: true, text: "Hourly Traffic Histogram" } } }
    });
  </script>
{% endif %}

<h3>IPs contributing to {{ report.ip_share }} of traffic</h3>
<ul>
{% for ip in report.top_ips %}
  <li>{{ ip }}</li>
{% else %}
  <li>none</li>
{% endfor %}
</ul>

<h3>Hours contributing to {{ report.hour_share }} of traffic</h3>
<ul>
{% for hour in report.peak_hours %}
  <li>{{ hour }}</li>
{% else %}
  <li>none</li>
{% endfor %}
</ul>
"###;

pub static UPLOAD_HTML: &str = r###"{% extends "base.html" %}
{% block title %}Analyze a log{% endblock title %}
{% block content %}
  <h2>Analyze a log</h2>
  <form action="/upload" method="post" enctype="multipart/form-data">
    <label>Log file
      <input type="file" name="log_file" required>
    </label>
    <button type="submit">Upload</button>
  </form>
  <form action="/fetch" method="post" style="margin-top:1rem">
    <label>Log URL
      <input type="url" name="url" placeholder="https://example.com/access.log" required>
    </label>
    <button type="submit">Fetch</button>
  </form>
{% endblock content %}
"###;
