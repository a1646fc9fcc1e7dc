//! Asset pipeline for CSS and JavaScript processing.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main CSS file.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Generate the main JavaScript file.
    pub fn generate_js() -> String {
        DEFAULT_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

// Code block theme containers are both in the markup; these rules show one.
const DEFAULT_CSS: &str = r#"/* folio - article theme */

:root {
  --content-max-width: 720px;
  --background: #ffffff;
  --foreground: #1f2328;
  --muted: #656d76;
  --border: #d0d7de;
  --accent: #0969da;
  --line-highlight: rgba(9, 105, 218, 0.12);
}

html.dark {
  --background: #0d1117;
  --foreground: #e6edf3;
  --muted: #8d96a0;
  --border: #30363d;
  --accent: #4493f8;
  --line-highlight: rgba(68, 147, 248, 0.18);
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: system-ui, -apple-system, sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

.site-header {
  display: flex;
  justify-content: space-between;
  align-items: center;
  max-width: var(--content-max-width);
  margin: 0 auto;
  padding: 1.5rem 1rem;
}

.site-title {
  font-weight: 700;
  color: var(--foreground);
  text-decoration: none;
}

.theme-toggle {
  background: none;
  border: 1px solid var(--border);
  border-radius: 0.375rem;
  color: var(--muted);
  padding: 0.25rem 0.75rem;
  cursor: pointer;
}

.main {
  max-width: var(--content-max-width);
  margin: 0 auto;
  padding: 0 1rem 4rem;
}

.article-meta {
  color: var(--muted);
  font-size: 0.875rem;
  margin-bottom: 1.5rem;
}

.tag {
  margin-left: 0.5rem;
}

.content h1 {
  font-size: 2.25rem;
  margin-bottom: 1.5rem;
}

.content h2 {
  font-size: 1.5rem;
  margin: 2rem 0 1rem;
}

.content p,
.content ul,
.content ol {
  margin-bottom: 1rem;
}

.content a {
  color: var(--accent);
}

.content code {
  font-family: ui-monospace, monospace;
  font-size: 0.875em;
}

/* Code blocks */
.code-block {
  position: relative;
  margin-bottom: 1.25rem;
}

.code-block-filename {
  font-family: ui-monospace, monospace;
  font-size: 0.8rem;
  color: var(--muted);
  border: 1px solid var(--border);
  border-bottom: none;
  border-radius: 0.5rem 0.5rem 0 0;
  padding: 0.375rem 1rem;
}

.code-highlighted {
  border: 1px solid var(--border);
  border-radius: 0.5rem;
  padding: 1rem 0;
  overflow-x: auto;
  font-size: 0.875rem;
}

.code-block-filename + .code-theme .code-highlighted {
  border-top-left-radius: 0;
  border-top-right-radius: 0;
}

.code-highlighted .line {
  display: inline-block;
  min-width: 100%;
  padding: 0 1rem;
}

.code-highlighted .line[data-highlighted] {
  background: var(--line-highlight);
}

.code-block .dark-active {
  display: none;
}

html.dark .code-block .light-active {
  display: none;
}

html.dark .code-block .dark-active {
  display: block;
}

.code-block-error {
  border: 1px solid #cf222e;
  color: #cf222e;
  border-radius: 0.375rem;
  padding: 0.5rem 0.75rem;
  margin-bottom: 1.25rem;
  font-size: 0.875rem;
}

.copy-btn {
  position: absolute;
  top: 0.5rem;
  right: 0.5rem;
  padding: 0.25rem 0.75rem;
  font-size: 0.75rem;
  border: 1px solid var(--border);
  border-radius: 0.375rem;
  background: var(--background);
  color: var(--muted);
  cursor: pointer;
}

/* Table of contents */
.toc {
  margin-top: 3rem;
  border-top: 1px solid var(--border);
  padding-top: 1rem;
}

.toc ul {
  list-style: none;
}

.toc-level-3 {
  padding-left: 1rem;
}

.article-list li {
  list-style: none;
  margin-bottom: 1.25rem;
}

.article-list time {
  color: var(--muted);
  font-size: 0.875rem;
  margin-left: 0.5rem;
}
"#;

const DEFAULT_JS: &str = r#"// folio - runtime JavaScript
(function() {
  'use strict';

  const root = document.documentElement;
  const stored = localStorage.getItem('theme');
  const prefersDark = window.matchMedia('(prefers-color-scheme: dark)').matches;

  if (stored === 'dark' || (!stored && prefersDark)) {
    root.classList.add('dark');
  }

  const toggle = document.querySelector('.theme-toggle');
  if (toggle) {
    toggle.addEventListener('click', () => {
      const dark = root.classList.toggle('dark');
      localStorage.setItem('theme', dark ? 'dark' : 'light');
    });
  }

  // Copy button for highlighted code blocks
  document.querySelectorAll('.code-block').forEach(block => {
    if (block.querySelector('.copy-btn')) return;

    const btn = document.createElement('button');
    btn.className = 'copy-btn';
    btn.textContent = 'Copy';
    btn.setAttribute('type', 'button');

    btn.addEventListener('click', async () => {
      const code = block.querySelector('.light-active code');
      const lines = code ? Array.from(code.querySelectorAll('.line')) : [];
      const text = lines.map(line => line.textContent).join('\n');

      try {
        await navigator.clipboard.writeText(text);
        btn.textContent = 'Copied!';
      } catch (err) {
        btn.textContent = 'Error';
      }
      setTimeout(() => { btn.textContent = 'Copy'; }, 2000);
    });

    block.appendChild(btn);
  });
})();
"#;
