//! Placeholder Clash document rendered when no conversion provider answers.

const SELECT_GROUP: &str = "🚀 节点选择";
const AUTO_GROUP: &str = "♻️ 自动选择";
const HEALTH_CHECK_URL: &str = "http://www.gstatic.com/generate_204";

pub fn proxy_name(index: usize) -> String {
    format!("Server-{}", index + 1)
}

/// Renders one placeholder `ss` proxy per link, a manual and an automatic
/// group listing every proxy, and a fixed rule set.
pub fn render(links: &[String], updated_at: &str, source_url: &str) -> String {
    let mut doc = format!(
        "# 更新时间: {updated_at}\n\
         # 源自网站源: {source_url}\n\
         \n\
         port: 7890\n\
         socks-port: 7891\n\
         allow-lan: true\n\
         mode: Rule\n\
         log-level: info\n\
         external-controller: 0.0.0.0:9090\n\
         \n\
         proxies:\n"
    );

    for index in 0..links.len() {
        let n = index + 1;
        doc.push_str(&format!(
            "\n  - name: {name}\n    type: ss\n    server: server{n}.example.com\n    port: 443\n    cipher: aes-256-gcm\n    password: password{n}\n    udp: true\n",
            name = proxy_name(index),
        ));
    }

    doc.push_str(&format!(
        "\nproxy-groups:\n  - name: {SELECT_GROUP}\n    type: select\n    proxies:\n"
    ));
    doc.push_str(&group_members(links.len()));

    doc.push_str(&format!(
        "\n  - name: {AUTO_GROUP}\n    type: url-test\n    url: {HEALTH_CHECK_URL}\n    interval: 300\n    proxies:\n"
    ));
    doc.push_str(&group_members(links.len()));

    doc.push_str(&format!(
        "\nrules:\n  - DOMAIN-SUFFIX,google.com,{SELECT_GROUP}\n  - DOMAIN-KEYWORD,github,{SELECT_GROUP}\n  - IP-CIDR,127.0.0.0/8,DIRECT\n  - GEOIP,CN,DIRECT\n  - MATCH,{SELECT_GROUP}\n"
    ));

    doc
}

fn group_members(count: usize) -> String {
    (0..count)
        .map(|index| format!("      - {}\n", proxy_name(index)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("ss://node{}@host:443", i)).collect()
    }

    fn proxy_entries(doc: &str) -> usize {
        doc.lines().filter(|l| l.starts_with("  - name: Server-")).count()
    }

    #[test]
    fn test_one_proxy_entry_per_link() {
        for n in [0, 1, 3, 12] {
            let doc = render(&links(n), "2026-10-18 09:00:00", "https://example.com/list");
            assert_eq!(proxy_entries(&doc), n, "links: {}", n);
            // 每個節點出現在兩個分組中
            assert_eq!(
                doc.lines().filter(|l| l.starts_with("      - Server-")).count(),
                n * 2
            );
        }
    }

    #[test]
    fn test_header_and_static_sections() {
        let doc = render(&links(2), "2026-10-18 09:00:00", "https://example.com/list");

        assert!(doc.starts_with("# 更新时间: 2026-10-18 09:00:00\n# 源自网站源: https://example.com/list\n"));
        assert!(doc.contains("\nport: 7890\n"));
        assert!(doc.contains("external-controller: 0.0.0.0:9090"));
        assert!(doc.contains("    server: server2.example.com\n"));
        assert!(doc.contains("    type: url-test\n"));
        assert!(doc.contains("  - MATCH,🚀 节点选择\n"));
        assert_eq!(doc.lines().filter(|l| l.contains(",DIRECT")).count(), 2);
    }

    #[test]
    fn test_groups_list_members_in_order() {
        let doc = render(&links(2), "2026-10-18 09:00:00", "https://example.com/list");
        assert!(doc.contains(
            "    type: select\n    proxies:\n      - Server-1\n      - Server-2\n\n  - name: ♻️ 自动选择\n"
        ));
        assert!(doc.contains("    interval: 300\n    proxies:\n      - Server-1\n      - Server-2\n\nrules:\n"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let a = render(&links(4), "2026-10-18 09:00:00", "https://example.com/list");
        let b = render(&links(4), "2026-10-18 09:00:00", "https://example.com/list");
        assert_eq!(a, b);
    }
}
