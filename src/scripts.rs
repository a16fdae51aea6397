//! Embedded remote script payloads
//!
//! These scripts run on the Pi via a single ssh invocation; the installer
//! never parses their contents, only the exit code and output. The install
//! script re-fetches the published payload itself so the Pi always runs
//! the current release, and the teardown script tolerates already-absent
//! state so uninstall can be re-run safely.

/// Self-contained install script: fetches the published installer, runs
/// it, then prints post-install diagnostics.
pub const INSTALL_SCRIPT: &str = r#"#!/bin/bash
set -e

echo "=== DreamPi Link Cable Installation ==="
echo "Timestamp: $(date)"
echo "User: $(whoami) (UID: $(id -u))"
echo "Directory: $(pwd)"
echo ""

# Prevent running as root
if [ "$(id -u)" = "0" ]; then
    echo "ERROR: This installer must NOT be run as root/sudo"
    echo "Please run as regular user: ./install.sh"
    exit 1
fi

echo "Downloading installation script..."
curl -sSL https://raw.githubusercontent.com/eaudunord/taisen-web-ui/main/install.sh -o /tmp/dreampi_install.sh

if [ ! -f "/tmp/dreampi_install.sh" ]; then
    echo "ERROR: Failed to download installation script"
    exit 1
fi

echo "Making script executable..."
chmod +x /tmp/dreampi_install.sh

echo "Running installation script..."
/tmp/dreampi_install.sh

echo ""
echo "=== Post-Installation Checks ==="

# Check installation directory
if [ -d "/opt/dreampi-linkcable" ]; then
    echo "OK: Installation directory exists"
    echo "Files installed:"
    ls -la /opt/dreampi-linkcable/ 2>/dev/null || echo "  Cannot list directory contents"
else
    echo "MISSING: Installation directory not found"
fi

# Check service status
echo ""
echo "Checking service status..."
if systemctl --user is-active --quiet dreampi-linkcable 2>/dev/null; then
    echo "OK: User service is active"
    systemctl --user status dreampi-linkcable --no-pager -l 2>/dev/null || true
elif sudo systemctl is-active --quiet dreampi-linkcable 2>/dev/null; then
    echo "OK: System service is active"
    sudo systemctl status dreampi-linkcable --no-pager -l 2>/dev/null || true
else
    echo "? Service status unclear - checking both user and system:"
    echo "User service:"
    systemctl --user status dreampi-linkcable --no-pager -l 2>/dev/null || echo "  Not found"
    echo "System service:"
    sudo systemctl status dreampi-linkcable --no-pager -l 2>/dev/null || echo "  Not found or no sudo access"
fi

# Test web server
echo ""
echo "Testing web server..."
if curl -s -m 10 http://localhost:1999 >/dev/null 2>&1; then
    echo "OK: Web server responding on port 1999"
else
    echo "NOT RESPONDING: Web server not responding on port 1999"
    echo "  This may be normal if the service is still starting"
fi

# Clean up
rm -f /tmp/dreampi_install.sh

echo ""
echo "=== Installation Complete ==="
echo "Timestamp: $(date)"
"#;

/// Idempotent teardown script: every step tolerates "already stopped" or
/// "already absent" so re-running is safe.
pub const UNINSTALL_SCRIPT: &str = r#"#!/bin/bash
set -e

SERVICE_NAME="dreampi-linkcable"
INSTALL_DIR="/opt/dreampi-linkcable"

echo "=== DreamPi Link Cable Web Server - Complete Uninstaller ==="
echo "Timestamp: $(date)"
echo "User: $(whoami) (UID: $(id -u))"
echo ""

# Stop service if running
echo "Stopping service..."
if sudo systemctl is-active --quiet ${SERVICE_NAME}.service 2>/dev/null; then
    sudo systemctl stop ${SERVICE_NAME}.service
    echo "OK: Service stopped"
else
    echo "OK: Service was not running"
fi

# Disable auto-start
echo "Disabling auto-start..."
if sudo systemctl is-enabled --quiet ${SERVICE_NAME}.service 2>/dev/null; then
    sudo systemctl disable ${SERVICE_NAME}.service
    echo "OK: Auto-start disabled"
else
    echo "OK: Auto-start was not enabled"
fi

# Remove service file
echo "Removing service file..."
if [ -f "/etc/systemd/system/${SERVICE_NAME}.service" ]; then
    sudo rm "/etc/systemd/system/${SERVICE_NAME}.service"
    echo "OK: Service file removed"
else
    echo "OK: Service file was not found"
fi

# Reload systemd
echo "Reloading systemd configuration..."
sudo systemctl daemon-reload
echo "OK: Systemd configuration reloaded"

# Remove installation directory
echo "Removing installation files..."
if [ -d "$INSTALL_DIR" ]; then
    sudo rm -rf "$INSTALL_DIR"
    echo "OK: Installation directory removed: $INSTALL_DIR"
else
    echo "OK: Installation directory was not found"
fi

echo ""
echo "=== Uninstall Complete ==="
echo "OK: Service stopped and disabled"
echo "OK: All installation files removed"
echo "OK: Auto-start configuration removed"
echo "OK: DreamPi Link Cable Web Server completely removed"
echo ""
echo "Uninstall completed successfully at $(date)"
"#;

/// Best-effort service status query used when post-install verification
/// cannot reach the portal port.
pub const SERVICE_STATUS_QUERY: &str =
    "systemctl --user is-active dreampi-linkcable 2>/dev/null || \
     sudo systemctl is-active dreampi-linkcable 2>/dev/null || \
     echo 'Service status unknown'";
