// Text parsers for systemctl / journalctl output.

use crate::models::ServiceRecord;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Status glyphs some systemctl versions print in front of failed or inactive units.
const STATUS_MARKERS: [&str; 2] = ["●", "*"];

/// Parse `systemctl list-units --no-legend` rows. A row needs at least unit, load, active and
/// sub columns; anything after the fourth column is the description, re-joined with single
/// spaces. Shorter rows are skipped.
pub(crate) fn parse_list_units(output: &str) -> Vec<ServiceRecord> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields: Vec<&str> = line.split_whitespace().collect();
            if fields.first().is_some_and(|f| STATUS_MARKERS.contains(f)) {
                fields.remove(0);
            }
            if fields.len() < 4 {
                return None;
            }
            Some(ServiceRecord {
                unit: fields[0].to_string(),
                name: fields[0]
                    .strip_suffix(".service")
                    .unwrap_or(fields[0])
                    .to_string(),
                load_state: fields[1].to_string(),
                active_state: fields[2].to_string(),
                sub_state: fields[3].to_string(),
                description: fields[4..].join(" "),
                ..Default::default()
            })
        })
        .collect()
}

/// Running units first, then by sub state, then by name.
pub(crate) fn compare_services(a: &ServiceRecord, b: &ServiceRecord) -> Ordering {
    let a_running = a.sub_state == "running";
    let b_running = b.sub_state == "running";
    b_running
        .cmp(&a_running)
        .then_with(|| a.sub_state.cmp(&b.sub_state))
        .then_with(|| a.name.cmp(&b.name))
}

pub(crate) fn sort_services(services: &mut [ServiceRecord]) {
    services.sort_by(compare_services);
}

/// Pull load state, active/sub state and main PID out of `systemctl status` text.
pub(crate) fn parse_status(name: &str, output: &str) -> ServiceRecord {
    let mut record = ServiceRecord {
        name: name.to_string(),
        ..Default::default()
    };
    for line in output.lines() {
        let line = line.trim();
        if line.contains("Loaded:") {
            let head = line.split(';').next().unwrap_or_default();
            if let Some(state) = head.trim_start_matches("Loaded:").split_whitespace().next() {
                record.load_state = state.to_string();
            }
        } else if line.contains("Active:") {
            let fields: Vec<&str> = line
                .trim_start_matches("Active:")
                .split_whitespace()
                .collect();
            if fields.len() >= 2 {
                record.active_state = fields[0].to_string();
                record.sub_state = fields[1].trim_matches(|c| c == '(' || c == ')').to_string();
            }
        } else if line.contains("Main PID:") {
            let mut parts = line.split_whitespace();
            if parts.any(|p| p == "PID:")
                && let Some(pid) = parts.next()
            {
                record.main_pid = pid.to_string();
            }
        }
    }
    record
}

/// `KEY=VALUE` lines from `systemctl show`, split on the first `=`.
pub(crate) fn parse_show(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Copy the interesting `systemctl show` properties onto the record.
pub(crate) fn apply_properties(record: &mut ServiceRecord, props: &HashMap<String, String>) {
    let fields = [
        ("Id", &mut record.unit),
        ("Description", &mut record.description),
        ("Type", &mut record.type_),
        ("MemoryCurrent", &mut record.memory),
        ("TasksCurrent", &mut record.tasks),
    ];
    for (key, slot) in fields {
        if let Some(v) = props.get(key) {
            *slot = v.clone();
        }
    }
}

/// Non-blank journal lines, order preserved.
pub(crate) fn journal_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, sub: &str) -> ServiceRecord {
        ServiceRecord {
            name: name.into(),
            sub_state: sub.into(),
            ..Default::default()
        }
    }

    #[test]
    fn list_units_parses_columns_and_joins_description() {
        let out = "ssh.service      loaded active running OpenBSD   Secure Shell server\n\
                   \n\
                   cron.service loaded active running Regular background program processing daemon\n";
        let services = parse_list_units(out);
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].unit, "ssh.service");
        assert_eq!(services[0].name, "ssh");
        assert_eq!(services[0].load_state, "loaded");
        assert_eq!(services[0].active_state, "active");
        assert_eq!(services[0].sub_state, "running");
        assert_eq!(services[0].description, "OpenBSD Secure Shell server");
        assert_eq!(services[1].name, "cron");
    }

    #[test]
    fn list_units_strips_service_suffix_once() {
        let services = parse_list_units("x.service.service loaded active running Odd name\n");
        assert_eq!(services[0].name, "x.service");
        let services = parse_list_units("getty@tty1.service loaded active running Getty\n");
        assert_eq!(services[0].name, "getty@tty1");
        let services = parse_list_units("foo.socket loaded active listening Foo\n");
        assert_eq!(services[0].name, "foo.socket");
    }

    #[test]
    fn list_units_skips_short_rows_and_status_markers() {
        let out = "broken line here\n\
                   ● nginx.service loaded failed failed A high performance web server\n\
                   plain.service loaded inactive dead\n";
        let services = parse_list_units(out);
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].name, "nginx");
        assert_eq!(services[0].active_state, "failed");
        assert_eq!(services[1].name, "plain");
        assert_eq!(services[1].description, "");
    }

    #[test]
    fn sort_puts_running_first_then_sub_state_then_name() {
        let mut services = vec![unit("b", "exited"), unit("a", "running"), unit("c", "exited")];
        sort_services(&mut services);
        let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn sort_orders_non_running_by_sub_state() {
        let mut services = vec![
            unit("z", "dead"),
            unit("y", "running"),
            unit("a", "exited"),
            unit("b", "dead"),
            unit("x", "running"),
        ];
        sort_services(&mut services);
        let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["x", "y", "b", "z", "a"]);
    }

    #[test]
    fn status_extracts_states_and_pid() {
        let out = "● nginx.service - A high performance web server\n\
                   \x20    Loaded: loaded (/lib/systemd/system/nginx.service; enabled; vendor preset: enabled)\n\
                   \x20    Active: active (running) since Mon 2024-01-01 10:00:00 UTC; 1 day ago\n\
                   \x20  Main PID: 1234 (nginx)\n\
                   \x20     Tasks: 3 (limit: 4915)\n";
        let record = parse_status("nginx", out);
        assert_eq!(record.name, "nginx");
        assert_eq!(record.load_state, "loaded");
        assert_eq!(record.active_state, "active");
        assert_eq!(record.sub_state, "running");
        assert_eq!(record.main_pid, "1234");
    }

    #[test]
    fn status_tolerates_empty_loaded_line() {
        let record = parse_status("x", "Loaded:\nActive: inactive\n");
        assert_eq!(record.load_state, "");
        assert_eq!(record.active_state, "");
    }

    #[test]
    fn show_splits_on_first_equals() {
        let props = parse_show("Type=simple\nExecStart={ path=/usr/bin/x ; argv[]=x }\nnoequals\n");
        assert_eq!(props.get("Type").map(String::as_str), Some("simple"));
        assert_eq!(
            props.get("ExecStart").map(String::as_str),
            Some("{ path=/usr/bin/x ; argv[]=x }")
        );
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn apply_properties_fills_record() {
        let props = parse_show(
            "Id=nginx.service\nDescription=Web server\nType=forking\nMemoryCurrent=1048576\nTasksCurrent=3\n",
        );
        let mut record = unit("nginx", "running");
        apply_properties(&mut record, &props);
        assert_eq!(record.unit, "nginx.service");
        assert_eq!(record.description, "Web server");
        assert_eq!(record.type_, "forking");
        assert_eq!(record.memory, "1048576");
        assert_eq!(record.tasks, "3");
    }

    #[test]
    fn journal_drops_blank_lines() {
        let lines = journal_lines("Jan 01 a\n\n   \nJan 01 b\n");
        assert_eq!(lines, ["Jan 01 a", "Jan 01 b"]);
    }
}
