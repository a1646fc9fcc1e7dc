//! Template engine for rendering article pages.

use minijinja::{context, Environment};

/// A table of contents entry.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// An article in the index listing.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ArticleSummary {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub date: Option<String>,
    pub tags: Vec<String>,
}

/// Context for rendering an article.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Context {
    /// Article title
    pub title: String,
    /// Site title
    pub site_title: String,
    /// Summary for the description meta tag
    pub description: Option<String>,
    /// Publication date
    pub date: Option<String>,
    /// Topic tags
    pub tags: Vec<String>,
    /// Rendered content HTML
    pub content: String,
    /// Table of contents
    pub toc: Vec<TocEntry>,
    /// Base URL
    pub base_url: String,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        for (name, source) in TEMPLATES {
            env.add_template(name, source)
                .unwrap_or_else(|e| panic!("built-in template {} is invalid: {}", name, e));
        }

        Self { env }
    }

    /// Render an article page.
    pub fn render_article(&self, context: &Context) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("article.html")?;

        tmpl.render(context! {
            title => &context.title,
            site_title => &context.site_title,
            description => &context.description,
            date => &context.date,
            tags => &context.tags,
            content => &context.content,
            toc => &context.toc,
            base_url => &context.base_url,
        })
    }

    /// Render the article listing.
    pub fn render_index(
        &self,
        site_title: &str,
        base_url: &str,
        articles: &[ArticleSummary],
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("index.html")?;

        tmpl.render(context! {
            title => site_title,
            site_title => site_title,
            base_url => base_url,
            articles => articles,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const TEMPLATES: [(&str, &str); 3] = [
    ("base.html", BASE_TEMPLATE),
    ("article.html", ARTICLE_TEMPLATE),
    ("index.html", INDEX_TEMPLATE),
];

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% if title != site_title %}{{ title }} - {% endif %}{{ site_title }}</title>
  {% if description %}<meta name="description" content="{{ description }}">
  {% endif %}<link rel="stylesheet" href="{{ base_url }}assets/main.css">
</head>
<body>
  <header class="site-header">
    <a href="{{ base_url }}" class="site-title">{{ site_title }}</a>
    <button type="button" class="theme-toggle" aria-label="Toggle theme">Theme</button>
  </header>
  <main class="main">
    {% block content %}{% endblock %}
  </main>
  <script src="{{ base_url }}assets/main.js"></script>
</body>
</html>"##;

const ARTICLE_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="article">
  {% if date or tags %}
  <p class="article-meta">
    {% if date %}<time datetime="{{ date }}">{{ date }}</time>{% endif %}
    {% for tag in tags %}<span class="tag">{{ tag }}</span>{% endfor %}
  </p>
  {% endif %}
  <div class="content">
    {{ content | safe }}
  </div>
</article>

{% if toc %}
<aside class="toc">
  <h2>On this page</h2>
  <ul>
  {% for entry in toc %}
    <li class="toc-level-{{ entry.level }}">
      <a href="#{{ entry.id }}">{{ entry.title }}</a>
    </li>
  {% endfor %}
  </ul>
</aside>
{% endif %}
{% endblock %}"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="article-list">
  <h1>Articles</h1>
  <ul>
  {% for article in articles %}
    <li>
      <a href="{{ article.url }}">{{ article.title }}</a>
      {% if article.date %}<time datetime="{{ article.date }}">{{ article.date }}</time>{% endif %}
      {% if article.description %}<p>{{ article.description }}</p>{% endif %}
    </li>
  {% endfor %}
  </ul>
</section>
{% endblock %}"##;
